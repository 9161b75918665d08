//! Canonical metric data model
//!
//! Records, direction policy and benchmark reference data shared by the
//! ingestion and comparison layers.

pub mod benchmark;
pub mod direction;
pub mod naming;
pub mod record;
pub mod summary;

pub use benchmark::{Benchmark, BenchmarkTable, DEFAULT_CATEGORY};
pub use direction::{DirectionTable, MetricDirection};
pub use record::MetricRecord;
pub use summary::DatasetSummary;
