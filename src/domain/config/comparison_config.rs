//! Comparison Configuration Domain Value Object
//!
//! Aggregation policy and metric direction table used by every comparison.

use crate::domain::metrics::direction::DirectionTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How several records of one team/metric collapse into a single aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AggregationPolicy {
    /// Mean of the records on the latest date; plain mean when nothing is dated.
    #[default]
    LatestByDate,
    Mean,
    Median,
    Sum,
    Min,
    Max,
}

impl fmt::Display for AggregationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregationPolicy::LatestByDate => "latest",
            AggregationPolicy::Mean => "mean",
            AggregationPolicy::Median => "median",
            AggregationPolicy::Sum => "sum",
            AggregationPolicy::Min => "min",
            AggregationPolicy::Max => "max",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for AggregationPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latest" | "latest-by-date" | "latest_by_date" => Ok(AggregationPolicy::LatestByDate),
            "mean" | "avg" | "average" => Ok(AggregationPolicy::Mean),
            "median" => Ok(AggregationPolicy::Median),
            "sum" => Ok(AggregationPolicy::Sum),
            "min" => Ok(AggregationPolicy::Min),
            "max" => Ok(AggregationPolicy::Max),
            _ => anyhow::bail!(
                "Invalid aggregation: {}. Must be 'latest', 'mean', 'median', 'sum', 'min' or 'max'",
                s
            ),
        }
    }
}

/// Comparison configuration value object
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonConfig {
    pub aggregation: AggregationPolicy,
    pub directions: DirectionTable,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self::new(AggregationPolicy::default(), DirectionTable::baseline())
    }
}

impl ComparisonConfig {
    pub fn new(aggregation: AggregationPolicy, directions: DirectionTable) -> Self {
        Self {
            aggregation,
            directions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_parsing() {
        assert_eq!(
            AggregationPolicy::from_str("Latest").unwrap(),
            AggregationPolicy::LatestByDate
        );
        assert_eq!(
            AggregationPolicy::from_str("avg").unwrap(),
            AggregationPolicy::Mean
        );
        assert!(AggregationPolicy::from_str("mode").is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for policy in [
            AggregationPolicy::LatestByDate,
            AggregationPolicy::Mean,
            AggregationPolicy::Median,
            AggregationPolicy::Sum,
            AggregationPolicy::Min,
            AggregationPolicy::Max,
        ] {
            assert_eq!(AggregationPolicy::from_str(&policy.to_string()).unwrap(), policy);
        }
    }
}
