use crate::domain::comparison::aggregation::aggregate;
use crate::domain::config::comparison_config::ComparisonConfig;
use crate::domain::metrics::direction::MetricDirection;
use crate::domain::metrics::record::MetricRecord;

/// Computes team and benchmark comparisons over caller-supplied records.
///
/// Holds only a borrowed configuration; every method is a pure function of
/// its arguments, so one engine can serve concurrent callers.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonEngine<'a> {
    config: &'a ComparisonConfig,
}

/// Aggregate of one team for one metric
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TeamAggregate {
    pub team: String,
    pub value: f64,
    pub record_count: usize,
}

impl<'a> ComparisonEngine<'a> {
    pub fn new(config: &'a ComparisonConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComparisonConfig {
        self.config
    }

    pub fn direction_for(&self, metric: &str) -> MetricDirection {
        self.config.directions.direction_for(metric)
    }

    pub(crate) fn select<'r>(
        &self,
        records: &'r [MetricRecord],
        team: &str,
        metric: &str,
    ) -> Vec<&'r MetricRecord> {
        records.iter().filter(|r| r.is_for(team, metric)).collect()
    }

    pub(crate) fn team_aggregate(
        &self,
        records: &[MetricRecord],
        team: &str,
        metric: &str,
    ) -> Option<TeamAggregate> {
        let selected = self.select(records, team, metric);
        aggregate(&selected, self.config.aggregation).map(|value| TeamAggregate {
            team: team.to_string(),
            value,
            record_count: selected.len(),
        })
    }

    /// Aggregates of the given teams, best first; ties by ascending team name.
    pub(crate) fn ranked_aggregates<T: AsRef<str>>(
        &self,
        records: &[MetricRecord],
        teams: &[T],
        metric: &str,
    ) -> Vec<TeamAggregate> {
        let direction = self.direction_for(metric);
        let mut aggregates: Vec<TeamAggregate> = teams
            .iter()
            .filter_map(|team| self.team_aggregate(records, team.as_ref(), metric))
            .collect();
        aggregates.sort_by(|a, b| {
            direction
                .better_first(a.value, b.value)
                .then_with(|| a.team.cmp(&b.team))
        });
        aggregates
    }
}

/// Distinct names in first-seen order.
pub(crate) fn distinct<T: AsRef<str>>(names: &[T]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        if !seen.iter().any(|s| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

/// Distinct team names present for a metric, sorted.
pub(crate) fn teams_for_metric(records: &[MetricRecord], metric: &str) -> Vec<String> {
    let mut teams: Vec<String> = records
        .iter()
        .filter(|r| r.metric == metric)
        .map(|r| r.team.clone())
        .collect();
    teams.sort();
    teams.dedup();
    teams
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::direction::DirectionTable;

    #[test]
    fn test_ranked_aggregates_respect_direction_and_ties() {
        let records = vec![
            MetricRecord::new("Gamma", "Cycle Time", 3.0),
            MetricRecord::new("Alpha", "Cycle Time", 5.0),
            MetricRecord::new("Beta", "Cycle Time", 3.0),
        ];
        let config = ComparisonConfig::new(Default::default(), DirectionTable::baseline());
        let engine = ComparisonEngine::new(&config);

        let ranked = engine.ranked_aggregates(&records, &["Alpha", "Beta", "Gamma"], "Cycle Time");
        let order: Vec<&str> = ranked.iter().map(|a| a.team.as_str()).collect();

        assert_eq!(order, vec!["Beta", "Gamma", "Alpha"]);
    }

    #[test]
    fn test_distinct_keeps_first_occurrence() {
        assert_eq!(distinct(&["B", "A", "B", "C"]), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_teams_for_metric_sorted() {
        let records = vec![
            MetricRecord::new("B", "Velocity", 1.0),
            MetricRecord::new("A", "Velocity", 1.0),
            MetricRecord::new("B", "Velocity", 2.0),
            MetricRecord::new("C", "Quality", 2.0),
        ];
        assert_eq!(teams_for_metric(&records, "Velocity"), vec!["A", "B"]);
    }
}
