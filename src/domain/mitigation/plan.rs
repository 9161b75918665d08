//! Mitigation plan lifecycle.
//!
//! A plan moves Draft -> Active when its first action item is added, and
//! Active -> Completed only on an explicit request once every non-cancelled
//! item is Done. Draft and Active plans can be cancelled. Completed and
//! Cancelled plans reject every further mutation.
//!
//! Every effective mutation bumps `version`; requesting a state the plan
//! already holds is a no-op. A failed operation leaves the plan untouched.

use crate::domain::errors::MitigationError;
use crate::domain::mitigation::action_item::{
    ActionItem, ActionItemStatus, ActionItemUpdate, NewActionItem,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlanStatus {
    #[default]
    Draft,
    Active,
    Completed,
    Cancelled,
}

impl PlanStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => f.write_str("Draft"),
            Self::Active => f.write_str("Active"),
            Self::Completed => f.write_str("Completed"),
            Self::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// Item counts of a plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanProgress {
    pub total: usize,
    pub done: usize,
    pub in_progress: usize,
    pub todo: usize,
    pub blocked: usize,
    pub cancelled: usize,
    /// `done / (total - cancelled)`, 0 when nothing is counted.
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationPlan {
    pub id: Uuid,
    pub team: String,
    pub metric: String,
    pub current_value: Option<f64>,
    pub target_value: f64,
    pub description: String,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
    pub action_items: Vec<ActionItem>,
}

impl MitigationPlan {
    pub fn new(
        team: impl Into<String>,
        metric: impl Into<String>,
        current_value: Option<f64>,
        target_value: f64,
        description: impl Into<String>,
    ) -> Result<Self, MitigationError> {
        let team = team.into();
        let metric = metric.into();
        check_value(&team, &metric, target_value)?;
        if let Some(current) = current_value {
            check_value(&team, &metric, current)?;
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            team,
            metric,
            current_value,
            target_value,
            description: description.into(),
            status: PlanStatus::Draft,
            created_at: now,
            updated_at: now,
            version: 0,
            action_items: Vec::new(),
        })
    }

    pub fn action_item(&self, item_id: Uuid) -> Option<&ActionItem> {
        self.action_items.iter().find(|item| item.id == item_id)
    }

    /// Append an action item; a Draft plan becomes Active.
    pub fn add_action_item(&mut self, new: NewActionItem) -> Result<Uuid, MitigationError> {
        self.ensure_mutable(PlanStatus::Active, "add an action item")?;
        if let Some(due_date) = new.due_date {
            self.check_due_date(due_date)?;
        }

        let now = Utc::now();
        let item = ActionItem::from_new(new, now);
        let id = item.id;
        self.action_items.push(item);
        if self.status == PlanStatus::Draft {
            self.status = PlanStatus::Active;
        }
        self.touch(now);
        Ok(id)
    }

    /// Draft -> Active; requires at least one action item.
    pub fn activate(&mut self) -> Result<(), MitigationError> {
        match self.status {
            PlanStatus::Active => Ok(()),
            PlanStatus::Draft if self.action_items.is_empty() => {
                Err(self.transition_error(PlanStatus::Active, "plan has no action items"))
            }
            PlanStatus::Draft => {
                self.status = PlanStatus::Active;
                self.touch(Utc::now());
                Ok(())
            }
            _ => Err(self.transition_error(PlanStatus::Active, "plan is closed")),
        }
    }

    pub fn set_item_status(
        &mut self,
        item_id: Uuid,
        status: ActionItemStatus,
    ) -> Result<(), MitigationError> {
        let index = self
            .action_items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| not_found(self.id, item_id))?;
        let current = self.action_items[index].status;

        // Retrying a state already reached succeeds, even on a closed plan
        if current == status {
            return Ok(());
        }
        self.ensure_mutable(self.status, "change an action item")?;
        if !current.can_transition_to(status) {
            return Err(MitigationError::InvalidStateTransition {
                entity: "action item".to_string(),
                id: item_id.to_string(),
                from: current.to_string(),
                to: status.to_string(),
                reason: "transition not allowed".to_string(),
            });
        }

        let now = Utc::now();
        let item = &mut self.action_items[index];
        item.status = status;
        item.updated_at = now;
        self.touch(now);
        Ok(())
    }

    /// Edit the descriptive fields of an action item; its status is unaffected.
    pub fn update_action_item(
        &mut self,
        item_id: Uuid,
        update: ActionItemUpdate,
    ) -> Result<(), MitigationError> {
        self.ensure_mutable(self.status, "edit an action item")?;
        if let Some(due_date) = update.due_date {
            self.check_due_date(due_date)?;
        }
        let plan_id = self.id;
        let item = self
            .action_items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| not_found(plan_id, item_id))?;

        let now = Utc::now();
        if let Some(title) = update.title {
            item.title = title;
        }
        if let Some(description) = update.description {
            item.description = description;
        }
        if let Some(priority) = update.priority {
            item.priority = priority;
        }
        if let Some(assignee) = update.assignee {
            item.assignee = Some(assignee);
        }
        if let Some(due_date) = update.due_date {
            item.due_date = Some(due_date);
        }
        item.updated_at = now;
        self.touch(now);
        Ok(())
    }

    /// Edit description and values of an open plan.
    pub fn update_details(
        &mut self,
        description: Option<String>,
        current_value: Option<f64>,
        target_value: Option<f64>,
    ) -> Result<(), MitigationError> {
        self.ensure_mutable(self.status, "edit the plan")?;
        for value in current_value.iter().chain(target_value.iter()) {
            check_value(&self.team, &self.metric, *value)?;
        }

        if let Some(description) = description {
            self.description = description;
        }
        if let Some(current) = current_value {
            self.current_value = Some(current);
        }
        if let Some(target) = target_value {
            self.target_value = target;
        }
        self.touch(Utc::now());
        Ok(())
    }

    /// Active -> Completed once every non-cancelled item is Done and at
    /// least one item is. A plan whose items were all cancelled has nothing
    /// to complete and can only be cancelled.
    pub fn complete(&mut self) -> Result<(), MitigationError> {
        match self.status {
            PlanStatus::Completed => Ok(()),
            PlanStatus::Active => {
                let open = self
                    .action_items
                    .iter()
                    .filter(|item| item.is_counted() && item.status != ActionItemStatus::Done)
                    .count();
                if open > 0 {
                    return Err(self.transition_error(
                        PlanStatus::Completed,
                        &format!("{} open action item(s)", open),
                    ));
                }
                if self.progress().done == 0 {
                    return Err(self.transition_error(
                        PlanStatus::Completed,
                        "every action item is cancelled; cancel the plan instead",
                    ));
                }
                self.status = PlanStatus::Completed;
                self.touch(Utc::now());
                Ok(())
            }
            PlanStatus::Draft => {
                Err(self.transition_error(PlanStatus::Completed, "plan was never activated"))
            }
            PlanStatus::Cancelled => {
                Err(self.transition_error(PlanStatus::Completed, "plan is cancelled"))
            }
        }
    }

    pub fn cancel(&mut self) -> Result<(), MitigationError> {
        match self.status {
            PlanStatus::Cancelled => Ok(()),
            PlanStatus::Completed => {
                Err(self.transition_error(PlanStatus::Cancelled, "plan is completed"))
            }
            PlanStatus::Draft | PlanStatus::Active => {
                self.status = PlanStatus::Cancelled;
                self.touch(Utc::now());
                Ok(())
            }
        }
    }

    pub fn progress(&self) -> PlanProgress {
        let count = |status: ActionItemStatus| {
            self.action_items
                .iter()
                .filter(|item| item.status == status)
                .count()
        };
        let total = self.action_items.len();
        let done = count(ActionItemStatus::Done);
        let cancelled = count(ActionItemStatus::Cancelled);
        let counted = total - cancelled;

        PlanProgress {
            total,
            done,
            in_progress: count(ActionItemStatus::InProgress),
            todo: count(ActionItemStatus::ToDo),
            blocked: count(ActionItemStatus::Blocked),
            cancelled,
            fraction: if counted == 0 {
                0.0
            } else {
                done as f64 / counted as f64
            },
        }
    }

    /// Case-insensitive substring match on team, metric and description.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [&self.team, &self.metric, &self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }

    fn ensure_mutable(&self, to: PlanStatus, action: &str) -> Result<(), MitigationError> {
        if self.status.is_terminal() {
            return Err(MitigationError::InvalidStateTransition {
                entity: "plan".to_string(),
                id: self.id.to_string(),
                from: self.status.to_string(),
                to: to.to_string(),
                reason: format!("cannot {} on a {} plan", action, self.status),
            });
        }
        Ok(())
    }

    fn check_due_date(&self, due_date: NaiveDate) -> Result<(), MitigationError> {
        let created = self.created_at.date_naive();
        if due_date < created {
            return Err(MitigationError::InvalidDueDate {
                due_date: due_date.to_string(),
                created: created.to_string(),
            });
        }
        Ok(())
    }

    fn transition_error(&self, to: PlanStatus, reason: &str) -> MitigationError {
        MitigationError::InvalidStateTransition {
            entity: "plan".to_string(),
            id: self.id.to_string(),
            from: self.status.to_string(),
            to: to.to_string(),
            reason: reason.to_string(),
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }
}

fn check_value(team: &str, metric: &str, value: f64) -> Result<(), MitigationError> {
    if !value.is_finite() {
        return Err(MitigationError::InvalidTarget {
            team: team.to_string(),
            metric: metric.to_string(),
            value,
        });
    }
    Ok(())
}

fn not_found(plan_id: Uuid, item_id: Uuid) -> MitigationError {
    MitigationError::ActionItemNotFound {
        plan_id: plan_id.to_string(),
        item_id: item_id.to_string(),
    }
}
