use crate::domain::comparison::aggregation::mean;
use crate::domain::comparison::engine::{ComparisonEngine, distinct, teams_for_metric};
use crate::domain::metrics::direction::MetricDirection;
use crate::domain::metrics::record::MetricRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Best and worst performer of one metric across every team with data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformerSummary {
    pub metric: String,
    pub direction: MetricDirection,
    pub best_team: String,
    pub best_value: f64,
    pub worst_team: String,
    pub worst_value: f64,
    /// `max - min` of the team aggregates.
    pub range: f64,
    pub team_count: usize,
}

/// Composite standing of one team across several metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamScore {
    pub team: String,
    /// Mean of the per-metric normalized scores, 0 to 100.
    pub score: f64,
    pub metrics_scored: usize,
    pub rank: usize,
}

impl ComparisonEngine<'_> {
    /// Best and worst team per metric; metrics without data are skipped.
    pub fn best_and_worst<M: AsRef<str>>(
        &self,
        records: &[MetricRecord],
        metrics: &[M],
    ) -> Vec<PerformerSummary> {
        distinct(metrics)
            .into_iter()
            .filter_map(|metric| {
                let teams = teams_for_metric(records, &metric);
                let ranked = self.ranked_aggregates(records, &teams, &metric);
                let best = ranked.first()?;
                let worst = ranked.last()?;
                Some(PerformerSummary {
                    direction: self.direction_for(&metric),
                    best_team: best.team.clone(),
                    best_value: best.value,
                    worst_team: worst.team.clone(),
                    worst_value: worst.value,
                    range: (best.value - worst.value).abs(),
                    team_count: ranked.len(),
                    metric,
                })
            })
            .collect()
    }

    /// Rank teams by their average min-max normalized score over `metrics`.
    ///
    /// Per metric the best aggregate scores 100 and the worst 0; when every
    /// team has the same aggregate they all score 50. A team is scored only
    /// on the metrics it has data for.
    pub fn performance_ranking<M: AsRef<str>>(
        &self,
        records: &[MetricRecord],
        metrics: &[M],
    ) -> Vec<TeamScore> {
        let mut per_team: BTreeMap<String, Vec<f64>> = BTreeMap::new();

        for metric in distinct(metrics) {
            let teams = teams_for_metric(records, &metric);
            let aggregates = self.ranked_aggregates(records, &teams, &metric);
            let values: Vec<f64> = aggregates.iter().map(|a| a.value).collect();
            let (Some(min), Some(max)) = (
                values.iter().copied().reduce(f64::min),
                values.iter().copied().reduce(f64::max),
            ) else {
                continue;
            };
            let direction = self.direction_for(&metric);

            for aggregate in aggregates {
                let score = normalized_score(aggregate.value, min, max, direction);
                per_team.entry(aggregate.team).or_default().push(score);
            }
        }

        let mut scores: Vec<TeamScore> = per_team
            .into_iter()
            .filter_map(|(team, scores)| {
                Some(TeamScore {
                    score: mean(&scores)?,
                    metrics_scored: scores.len(),
                    team,
                    rank: 0,
                })
            })
            .collect();
        scores.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.team.cmp(&b.team)));
        for (index, score) in scores.iter_mut().enumerate() {
            score.rank = index + 1;
        }
        scores
    }
}

fn normalized_score(value: f64, min: f64, max: f64, direction: MetricDirection) -> f64 {
    if max == min {
        return 50.0;
    }
    let scaled = (value - min) / (max - min) * 100.0;
    match direction {
        MetricDirection::HigherIsBetter => scaled,
        MetricDirection::LowerIsBetter => 100.0 - scaled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::comparison_config::{AggregationPolicy, ComparisonConfig};
    use crate::domain::metrics::direction::DirectionTable;

    fn records() -> Vec<MetricRecord> {
        vec![
            MetricRecord::new("TeamA", "Velocity", 20.0),
            MetricRecord::new("TeamB", "Velocity", 30.0),
            MetricRecord::new("TeamC", "Velocity", 25.0),
            MetricRecord::new("TeamA", "Defect Rate", 0.01),
            MetricRecord::new("TeamB", "Defect Rate", 0.09),
            MetricRecord::new("TeamC", "Defect Rate", 0.05),
        ]
    }

    fn config() -> ComparisonConfig {
        ComparisonConfig::new(AggregationPolicy::Mean, DirectionTable::baseline())
    }

    #[test]
    fn test_best_and_worst_respects_direction() {
        let config = config();
        let engine = ComparisonEngine::new(&config);
        let summaries = engine.best_and_worst(&records(), &["Velocity", "Defect Rate", "Missing"]);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].best_team, "TeamB");
        assert_eq!(summaries[0].worst_team, "TeamA");
        assert_eq!(summaries[0].range, 10.0);
        assert_eq!(summaries[1].best_team, "TeamA");
        assert_eq!(summaries[1].worst_team, "TeamB");
        assert_eq!(summaries[1].team_count, 3);
    }

    #[test]
    fn test_performance_ranking_averages_normalized_scores() {
        let config = config();
        let engine = ComparisonEngine::new(&config);
        let ranking = engine.performance_ranking(&records(), &["Velocity", "Defect Rate"]);

        // TeamA: 0 + 100, TeamB: 100 + 0, TeamC: 50 + 50
        assert_eq!(ranking.len(), 3);
        for score in &ranking {
            assert!((score.score - 50.0).abs() < 1e-9);
            assert_eq!(score.metrics_scored, 2);
        }
        let order: Vec<&str> = ranking.iter().map(|s| s.team.as_str()).collect();
        assert_eq!(order, vec!["TeamA", "TeamB", "TeamC"]);
        assert_eq!(ranking[2].rank, 3);
    }

    #[test]
    fn test_equal_values_score_fifty() {
        let records = vec![
            MetricRecord::new("TeamA", "Velocity", 10.0),
            MetricRecord::new("TeamB", "Velocity", 10.0),
        ];
        let config = config();
        let engine = ComparisonEngine::new(&config);
        let ranking = engine.performance_ranking(&records, &["Velocity"]);

        assert_eq!(ranking[0].score, 50.0);
        assert_eq!(ranking[1].score, 50.0);
    }

    #[test]
    fn test_ranking_orders_by_score() {
        let config = config();
        let engine = ComparisonEngine::new(&config);
        let ranking = engine.performance_ranking(&records(), &["Velocity"]);

        assert_eq!(ranking[0].team, "TeamB");
        assert_eq!(ranking[0].score, 100.0);
        assert_eq!(ranking[2].team, "TeamA");
        assert_eq!(ranking[2].score, 0.0);
    }
}
