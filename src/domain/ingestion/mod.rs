//! Tabular ingestion
//!
//! Raw table → alias resolution → shape detection → normalization into
//! canonical `MetricRecord`s. Every step is a pure function of its inputs.

pub mod alias;
pub mod coerce;
pub mod normalizer;
pub mod shape;
pub mod table;

pub use alias::{CanonicalRole, RoleMapping, SynonymTable, resolve_columns};
pub use normalizer::{NormalizationReport, Normalized, Normalizer, Rejection, RejectionReason};
pub use shape::{InputShape, ShapeDecision, detect_shape};
pub use table::{Cell, RawTable, Row};
