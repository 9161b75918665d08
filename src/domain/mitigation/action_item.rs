use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
            Priority::Critical => write!(f, "Critical"),
        }
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => anyhow::bail!(
                "Invalid priority: {}. Must be 'low', 'medium', 'high' or 'critical'",
                s
            ),
        }
    }
}

/// Lifecycle state of an action item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActionItemStatus {
    #[default]
    ToDo,
    InProgress,
    Done,
    Blocked,
    Cancelled,
}

impl ActionItemStatus {
    /// Done and Cancelled accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    pub fn valid_transitions(self) -> &'static [ActionItemStatus] {
        match self {
            Self::ToDo => &[Self::InProgress, Self::Blocked, Self::Cancelled],
            Self::InProgress => &[Self::Done, Self::Blocked, Self::Cancelled],
            Self::Blocked => &[Self::InProgress, Self::Cancelled],
            Self::Done | Self::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.valid_transitions().contains(&target)
    }
}

impl fmt::Display for ActionItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToDo => f.write_str("To Do"),
            Self::InProgress => f.write_str("In Progress"),
            Self::Done => f.write_str("Done"),
            Self::Blocked => f.write_str("Blocked"),
            Self::Cancelled => f.write_str("Cancelled"),
        }
    }
}

impl FromStr for ActionItemStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match key.as_str() {
            "todo" => Ok(Self::ToDo),
            "inprogress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "blocked" => Ok(Self::Blocked),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => anyhow::bail!(
                "Invalid action item status: {}. Must be 'todo', 'in-progress', 'done', 'blocked' or 'cancelled'",
                s
            ),
        }
    }
}

/// A unit of work inside a mitigation plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: ActionItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when adding an action item to a plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewActionItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl NewActionItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Partial edit of an action item's descriptive fields; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionItemUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl ActionItem {
    pub(crate) fn from_new(new: NewActionItem, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            priority: new.priority,
            assignee: new.assignee,
            due_date: new.due_date,
            status: ActionItemStatus::ToDo,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the item still counts towards completion accounting.
    pub fn is_counted(&self) -> bool {
        self.status != ActionItemStatus::Cancelled
    }

    /// Past its due date and not yet finished.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_terminal() && self.due_date.is_some_and(|due| due < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use ActionItemStatus::*;

        assert!(ToDo.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Done));
        assert!(ToDo.can_transition_to(Blocked));
        assert!(Blocked.can_transition_to(InProgress));
        assert!(Blocked.can_transition_to(Cancelled));

        assert!(!ToDo.can_transition_to(Done));
        assert!(!Blocked.can_transition_to(Done));
        assert!(!Done.can_transition_to(InProgress));
        assert!(!Cancelled.can_transition_to(ToDo));
        assert!(Done.is_terminal());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            ActionItemStatus::from_str("In Progress").unwrap(),
            ActionItemStatus::InProgress
        );
        assert_eq!(
            ActionItemStatus::from_str("to-do").unwrap(),
            ActionItemStatus::ToDo
        );
        assert_eq!(
            ActionItemStatus::from_str("in_progress").unwrap(),
            ActionItemStatus::InProgress
        );
        assert!(ActionItemStatus::from_str("finished").is_err());
    }

    #[test]
    fn test_priority_parsing_and_order() {
        assert_eq!(Priority::from_str("CRITICAL").unwrap(), Priority::Critical);
        assert!(Priority::from_str("urgent").is_err());
        assert!(Priority::Critical > Priority::Low);
    }

    #[test]
    fn test_overdue() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut item = ActionItem::from_new(
            NewActionItem::new("Pair on flaky tests")
                .with_due_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
            Utc::now(),
        );
        assert!(item.is_overdue(today));

        item.status = ActionItemStatus::Done;
        assert!(!item.is_overdue(today));
    }
}
