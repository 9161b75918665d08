use crate::domain::comparison::engine::{ComparisonEngine, distinct};
use crate::domain::errors::ComparisonError;
use crate::domain::metrics::direction::MetricDirection;
use crate::domain::metrics::record::MetricRecord;
use serde::Serialize;

/// One team's standing for a metric relative to the baseline team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub team: String,
    pub aggregate_value: f64,
    pub delta_from_baseline: f64,
    /// `delta / baseline` as a fraction; `None` when the baseline aggregate is zero.
    pub percent_delta: Option<f64>,
    /// Position 1..n in the ordering; tied aggregates are split by team name.
    pub rank: usize,
    pub record_count: usize,
}

/// Team-vs-team comparison for a single metric, rows ordered by rank
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub metric: String,
    pub direction: MetricDirection,
    pub baseline_team: String,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonResult {
    pub fn row(&self, team: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|row| row.team == team)
    }
}

impl ComparisonEngine<'_> {
    /// Compare teams on every requested metric.
    ///
    /// The baseline defaults to the first team in `teams`. Fails on the first
    /// metric that cannot be compared.
    pub fn compare_teams<T: AsRef<str>, M: AsRef<str>>(
        &self,
        records: &[MetricRecord],
        teams: &[T],
        metrics: &[M],
        baseline: Option<&str>,
    ) -> Result<Vec<ComparisonResult>, ComparisonError> {
        distinct(metrics)
            .iter()
            .map(|metric| self.compare_metric(records, teams, metric, baseline))
            .collect()
    }

    /// Compare teams on one metric.
    ///
    /// # Errors
    ///
    /// - `InsufficientTeams` when fewer than two distinct teams are requested
    ///   or fewer than two of them have records for `metric`
    /// - `UnknownBaseline` when `baseline` is not one of `teams`
    /// - `MissingBaseline` when the baseline team has no records for `metric`
    pub fn compare_metric<T: AsRef<str>>(
        &self,
        records: &[MetricRecord],
        teams: &[T],
        metric: &str,
        baseline: Option<&str>,
    ) -> Result<ComparisonResult, ComparisonError> {
        let teams = distinct(teams);
        let ranked = self.ranked_aggregates(records, &teams, metric);

        if teams.len() < 2 || ranked.len() < 2 {
            let mut teams_with_data: Vec<String> = ranked.iter().map(|a| a.team.clone()).collect();
            teams_with_data.sort();
            return Err(ComparisonError::InsufficientTeams {
                metric: metric.to_string(),
                teams_with_data,
            });
        }

        let baseline_team = match baseline {
            Some(name) if teams.iter().any(|t| t == name) => name.to_string(),
            Some(name) => {
                return Err(ComparisonError::UnknownBaseline {
                    baseline: name.to_string(),
                });
            }
            None => teams[0].clone(),
        };

        let baseline_value = ranked
            .iter()
            .find(|a| a.team == baseline_team)
            .map(|a| a.value)
            .ok_or_else(|| ComparisonError::MissingBaseline {
                baseline: baseline_team.clone(),
                metric: metric.to_string(),
            })?;

        let rows = ranked
            .into_iter()
            .enumerate()
            .map(|(index, aggregate)| {
                let delta = aggregate.value - baseline_value;
                ComparisonRow {
                    team: aggregate.team,
                    aggregate_value: aggregate.value,
                    delta_from_baseline: delta,
                    percent_delta: (baseline_value != 0.0).then(|| delta / baseline_value),
                    rank: index + 1,
                    record_count: aggregate.record_count,
                }
            })
            .collect();

        Ok(ComparisonResult {
            metric: metric.to_string(),
            direction: self.direction_for(metric),
            baseline_team,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::comparison_config::{AggregationPolicy, ComparisonConfig};
    use crate::domain::metrics::direction::DirectionTable;

    fn engine_config() -> ComparisonConfig {
        ComparisonConfig::new(AggregationPolicy::Mean, DirectionTable::baseline())
    }

    #[test]
    fn test_deltas_and_ranks() {
        let records = vec![
            MetricRecord::new("TeamA", "Velocity", 25.0),
            MetricRecord::new("TeamB", "Velocity", 30.0),
            MetricRecord::new("TeamC", "Velocity", 20.0),
        ];
        let config = engine_config();
        let engine = ComparisonEngine::new(&config);

        let result = engine
            .compare_metric(&records, &["TeamA", "TeamB", "TeamC"], "Velocity", None)
            .unwrap();

        assert_eq!(result.baseline_team, "TeamA");
        let teams: Vec<&str> = result.rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(teams, vec!["TeamB", "TeamA", "TeamC"]);
        let c = result.row("TeamC").unwrap();
        assert_eq!(c.delta_from_baseline, -5.0);
        assert_eq!(c.percent_delta, Some(-0.2));
        assert_eq!(c.rank, 3);
        assert_eq!(result.row("TeamA").unwrap().delta_from_baseline, 0.0);
    }

    #[test]
    fn test_lower_is_better_ranks_ascending() {
        let records = vec![
            MetricRecord::new("TeamA", "Defect Rate", 0.10),
            MetricRecord::new("TeamB", "Defect Rate", 0.02),
        ];
        let config = engine_config();
        let engine = ComparisonEngine::new(&config);

        let result = engine
            .compare_metric(&records, &["TeamA", "TeamB"], "Defect Rate", None)
            .unwrap();

        assert_eq!(result.direction, MetricDirection::LowerIsBetter);
        assert_eq!(result.rows[0].team, "TeamB");
        assert_eq!(result.rows[0].rank, 1);
    }

    #[test]
    fn test_zero_baseline_has_no_percent_delta() {
        let records = vec![
            MetricRecord::new("TeamA", "Incidents", 0.0),
            MetricRecord::new("TeamB", "Incidents", 3.0),
        ];
        let config = engine_config();
        let engine = ComparisonEngine::new(&config);

        let result = engine
            .compare_metric(&records, &["TeamA", "TeamB"], "Incidents", None)
            .unwrap();

        assert_eq!(result.row("TeamB").unwrap().delta_from_baseline, 3.0);
        assert_eq!(result.row("TeamB").unwrap().percent_delta, None);
    }

    #[test]
    fn test_insufficient_teams() {
        let records = vec![MetricRecord::new("TeamA", "Velocity", 25.0)];
        let config = engine_config();
        let engine = ComparisonEngine::new(&config);

        let err = engine
            .compare_metric(&records, &["TeamA", "TeamB"], "Velocity", None)
            .unwrap_err();
        assert_eq!(
            err,
            ComparisonError::InsufficientTeams {
                metric: "Velocity".to_string(),
                teams_with_data: vec!["TeamA".to_string()],
            }
        );

        let err = engine
            .compare_metric(&records, &["TeamA", "TeamA"], "Velocity", None)
            .unwrap_err();
        assert!(matches!(err, ComparisonError::InsufficientTeams { .. }));
    }

    #[test]
    fn test_baseline_errors() {
        let records = vec![
            MetricRecord::new("TeamA", "Velocity", 25.0),
            MetricRecord::new("TeamB", "Velocity", 30.0),
            MetricRecord::new("TeamC", "Quality", 1.0),
        ];
        let config = engine_config();
        let engine = ComparisonEngine::new(&config);

        let err = engine
            .compare_metric(&records, &["TeamA", "TeamB"], "Velocity", Some("TeamZ"))
            .unwrap_err();
        assert!(matches!(err, ComparisonError::UnknownBaseline { .. }));

        let err = engine
            .compare_metric(&records, &["TeamC", "TeamA", "TeamB"], "Velocity", None)
            .unwrap_err();
        assert_eq!(
            err,
            ComparisonError::MissingBaseline {
                baseline: "TeamC".to_string(),
                metric: "Velocity".to_string(),
            }
        );
    }

    #[test]
    fn test_compare_teams_covers_each_metric_once() {
        let records = vec![
            MetricRecord::new("TeamA", "Velocity", 25.0),
            MetricRecord::new("TeamB", "Velocity", 30.0),
            MetricRecord::new("TeamA", "Quality", 90.0),
            MetricRecord::new("TeamB", "Quality", 80.0),
        ];
        let config = engine_config();
        let engine = ComparisonEngine::new(&config);

        let results = engine
            .compare_teams(
                &records,
                &["TeamB", "TeamA"],
                &["Velocity", "Quality", "Velocity"],
                None,
            )
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].baseline_team, "TeamB");
        assert_eq!(results[1].rows[0].team, "TeamA");
    }
}
