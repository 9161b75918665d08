// Team-vs-team, benchmark and trend analytics
pub mod comparison;

// Configuration value objects
pub mod config;

// Domain-specific error types
pub mod errors;

// Raw table ingestion and normalization
pub mod ingestion;

// Canonical records, directions and benchmarks
pub mod metrics;

// Mitigation plans and action items
pub mod mitigation;

// Repository traits
pub mod repositories;
