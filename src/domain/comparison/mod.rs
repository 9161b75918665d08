pub mod aggregation;
pub mod benchmark_comparison;
pub mod engine;
pub mod ranking;
pub mod statistics;
pub mod team_comparison;
pub mod trend;

pub use aggregation::aggregate;
pub use benchmark_comparison::{
    BenchmarkComparison, BenchmarkResult, UnmatchedPair, UnmatchedReason,
};
pub use engine::ComparisonEngine;
pub use ranking::{PerformerSummary, TeamScore};
pub use statistics::{
    DescriptiveStats, FlaggedRecord, OutlierMethod, TeamMetricStats, detect_outliers, percentile,
};
pub use team_comparison::{ComparisonResult, ComparisonRow};
pub use trend::{DateRange, PeriodComparison, PeriodSummary, TrendAnalysis, TrendDirection};
