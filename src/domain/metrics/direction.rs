use crate::domain::metrics::naming::lookup_key;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Whether higher or lower values represent better performance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDirection {
    #[default]
    HigherIsBetter,
    LowerIsBetter,
}

impl MetricDirection {
    /// Orders two aggregates so that the better one sorts first.
    pub fn better_first(&self, a: f64, b: f64) -> Ordering {
        match self {
            MetricDirection::HigherIsBetter => b.total_cmp(&a),
            MetricDirection::LowerIsBetter => a.total_cmp(&b),
        }
    }

    /// Whether a gap (actual - target) counts as meeting the target.
    pub fn is_met(&self, gap: f64) -> bool {
        match self {
            MetricDirection::HigherIsBetter => gap >= 0.0,
            MetricDirection::LowerIsBetter => gap <= 0.0,
        }
    }
}

impl fmt::Display for MetricDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricDirection::HigherIsBetter => write!(f, "higher_is_better"),
            MetricDirection::LowerIsBetter => write!(f, "lower_is_better"),
        }
    }
}

impl FromStr for MetricDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match lookup_key(s).replace(['-', ' '], "_").as_str() {
            "higher_is_better" | "higher" | "up" => Ok(MetricDirection::HigherIsBetter),
            "lower_is_better" | "lower" | "down" => Ok(MetricDirection::LowerIsBetter),
            _ => anyhow::bail!(
                "Invalid direction: {}. Must be 'higher_is_better' or 'lower_is_better'",
                s
            ),
        }
    }
}

/// Per-metric direction policy, keyed case- and whitespace-insensitively.
///
/// Metrics without an entry are HigherIsBetter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectionTable {
    entries: HashMap<String, MetricDirection>,
}

impl DirectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Baseline table of metrics where lower values are better.
    pub fn baseline() -> Self {
        let mut table = Self::new();
        for metric in [
            "defect rate",
            "defects",
            "bug count",
            "cycle time",
            "lead time",
            "mttr",
            "mean time to recovery",
            "change failure rate",
            "escaped defects",
            "incident count",
            "response time",
        ] {
            table.set(metric, MetricDirection::LowerIsBetter);
        }
        table
    }

    pub fn set(&mut self, metric: &str, direction: MetricDirection) {
        self.entries.insert(lookup_key(metric), direction);
    }

    pub fn direction_for(&self, metric: &str) -> MetricDirection {
        self.entries
            .get(&lookup_key(metric))
            .copied()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
