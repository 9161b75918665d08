use crate::domain::comparison::aggregation::aggregate;
use crate::domain::comparison::engine::{ComparisonEngine, distinct};
use crate::domain::errors::ComparisonError;
use crate::domain::metrics::benchmark::BenchmarkTable;
use crate::domain::metrics::direction::MetricDirection;
use crate::domain::metrics::record::MetricRecord;
use serde::Serialize;

/// Actual-vs-target outcome for one (team, metric) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkResult {
    pub team: String,
    pub metric: String,
    pub category: String,
    pub actual_value: f64,
    pub target_value: f64,
    /// `actual - target`; positive always means the actual exceeds the target.
    pub gap: f64,
    /// `gap / target` as a fraction; `None` for a zero target.
    pub percent_gap: Option<f64>,
    pub direction: MetricDirection,
    pub meets_benchmark: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UnmatchedReason {
    NoData,
    NoBenchmark { category: String },
}

/// A requested pair left out of the results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedPair {
    pub team: String,
    pub metric: String,
    pub reason: UnmatchedReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BenchmarkComparison {
    pub results: Vec<BenchmarkResult>,
    pub unmatched: Vec<UnmatchedPair>,
}

impl ComparisonEngine<'_> {
    /// Compare each team's aggregate against the matching benchmark.
    ///
    /// The benchmark category is taken from the team's latest record that
    /// carries one, falling back to the table's default category. Pairs
    /// without data or without a benchmark are reported in `unmatched`.
    ///
    /// # Errors
    ///
    /// `NoBenchmarkAvailable` when not a single pair could be matched.
    pub fn compare_to_benchmarks<T: AsRef<str>, M: AsRef<str>>(
        &self,
        records: &[MetricRecord],
        teams: &[T],
        metrics: &[M],
        benchmarks: &BenchmarkTable,
    ) -> Result<BenchmarkComparison, ComparisonError> {
        let teams = distinct(teams);
        let metrics = distinct(metrics);
        let mut comparison = BenchmarkComparison::default();

        for team in &teams {
            for metric in &metrics {
                let selected = self.select(records, team, metric);
                let Some(actual) = aggregate(&selected, self.config().aggregation) else {
                    comparison.unmatched.push(UnmatchedPair {
                        team: team.clone(),
                        metric: metric.clone(),
                        reason: UnmatchedReason::NoData,
                    });
                    continue;
                };

                let category = latest_category(&selected);
                let Some(benchmark) = benchmarks.lookup(category, metric) else {
                    comparison.unmatched.push(UnmatchedPair {
                        team: team.clone(),
                        metric: metric.clone(),
                        reason: UnmatchedReason::NoBenchmark {
                            category: category
                                .unwrap_or(benchmarks.default_category())
                                .to_string(),
                        },
                    });
                    continue;
                };

                let gap = actual - benchmark.target_value;
                comparison.results.push(BenchmarkResult {
                    team: team.clone(),
                    metric: metric.clone(),
                    category: benchmark.category.clone(),
                    actual_value: actual,
                    target_value: benchmark.target_value,
                    gap,
                    percent_gap: (benchmark.target_value != 0.0)
                        .then(|| gap / benchmark.target_value),
                    direction: benchmark.direction,
                    meets_benchmark: benchmark.direction.is_met(gap),
                });
            }
        }

        if comparison.results.is_empty() {
            return Err(ComparisonError::NoBenchmarkAvailable {
                requested: teams.len() * metrics.len(),
            });
        }
        Ok(comparison)
    }
}

/// Category of the most recent record carrying one; later input wins on equal dates.
fn latest_category<'r>(records: &[&'r MetricRecord]) -> Option<&'r str> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.category.is_some())
        .max_by_key(|(index, r)| (r.date, *index))
        .and_then(|(_, r)| r.category.as_deref())
}
