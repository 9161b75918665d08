//! Normalization Configuration Domain Value Object
//!
//! Encapsulates how the normalizer treats bad cells and which calendar
//! formats it tries, with validation on construction.

use crate::domain::ingestion::coerce::DEFAULT_DATE_FORMATS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for NormalizationConfig validation
#[derive(Debug, Error, PartialEq)]
pub enum NormalizationConfigError {
    #[error("Empty date format list")]
    EmptyDateFormats,

    #[error("Blank date format at position {index}")]
    BlankDateFormat { index: usize },
}

/// What to do with a cell that cannot become a finite value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RejectionPolicy {
    /// Reject the offending row (long form) or emitted record (wide form), count it, continue.
    #[default]
    RejectRow,
    /// Fail the whole normalization call on the first invalid cell.
    AbortAll,
}

impl fmt::Display for RejectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionPolicy::RejectRow => write!(f, "reject-row"),
            RejectionPolicy::AbortAll => write!(f, "abort-all"),
        }
    }
}

impl FromStr for RejectionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "reject-row" | "reject" => Ok(RejectionPolicy::RejectRow),
            "abort-all" | "abort" => Ok(RejectionPolicy::AbortAll),
            _ => anyhow::bail!(
                "Invalid rejection policy: {}. Must be 'reject-row' or 'abort-all'",
                s
            ),
        }
    }
}

/// Normalization configuration value object
///
/// # Invariants
///
/// - `date_formats` is non-empty and holds no blank entries
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationConfig {
    pub policy: RejectionPolicy,
    pub date_formats: Vec<String>,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            policy: RejectionPolicy::default(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl NormalizationConfig {
    /// Create a new NormalizationConfig with validation
    ///
    /// # Errors
    ///
    /// Returns `NormalizationConfigError` if the format list is empty or has blanks
    pub fn new(
        policy: RejectionPolicy,
        date_formats: Vec<String>,
    ) -> Result<Self, NormalizationConfigError> {
        let config = Self {
            policy,
            date_formats,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_policy(mut self, policy: RejectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn validate(&self) -> Result<(), NormalizationConfigError> {
        if self.date_formats.is_empty() {
            return Err(NormalizationConfigError::EmptyDateFormats);
        }
        if let Some(index) = self.date_formats.iter().position(|f| f.trim().is_empty()) {
            return Err(NormalizationConfigError::BlankDateFormat { index });
        }
        Ok(())
    }
}
