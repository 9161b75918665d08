use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Canonical long-form observation: one value of one metric for one team.
///
/// The storage layer assigns `id` and `created_at`; the normalizer only
/// carries them over when a long-form input already has them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub id: Option<i64>,
    pub team: String,
    pub metric: String,
    pub value: f64,
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub project: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl MetricRecord {
    pub fn new(team: impl Into<String>, metric: impl Into<String>, value: f64) -> Self {
        Self {
            id: None,
            team: team.into(),
            metric: metric.into(),
            value,
            date: None,
            category: None,
            unit: None,
            project: None,
            notes: None,
            created_at: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// True when this record belongs to the given team and metric (exact names).
    pub fn is_for(&self, team: &str, metric: &str) -> bool {
        self.team == team && self.metric == metric
    }
}
