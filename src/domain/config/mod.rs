//! Configuration domain module
//!
//! Validated value objects handed to the normalizer and the comparison
//! engine. Loading them from the environment or a file is the job of
//! `crate::config`.

pub mod comparison_config;
pub mod normalization_config;

pub use comparison_config::{AggregationPolicy, ComparisonConfig};
pub use normalization_config::{NormalizationConfig, NormalizationConfigError, RejectionPolicy};
