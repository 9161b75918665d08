use thiserror::Error;

/// Errors raised while turning a raw table into canonical metric records
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IngestionError {
    #[error("Unrecognized schema: {reason} (columns: [{}])", .columns.join(", "))]
    UnrecognizedSchema { reason: String, columns: Vec<String> },

    #[error("Invalid value at row {row}, column '{column}': '{raw}' is not a finite number")]
    InvalidValue {
        row: usize,
        column: String,
        raw: String,
    },

    #[error("Missing {field} at row {row} (column '{column}')")]
    MissingField {
        row: usize,
        field: String,
        column: String,
    },
}

/// Errors related to team and benchmark comparisons
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ComparisonError {
    #[error("Insufficient teams for {metric}: need at least 2 with data, found [{}]", .teams_with_data.join(", "))]
    InsufficientTeams {
        metric: String,
        teams_with_data: Vec<String>,
    },

    #[error("Baseline team {baseline} is not part of the compared teams")]
    UnknownBaseline { baseline: String },

    #[error("Baseline team {baseline} has no records for {metric}")]
    MissingBaseline { baseline: String, metric: String },

    #[error("No benchmark available for any of {requested} requested team/metric pairs")]
    NoBenchmarkAvailable { requested: usize },

    #[error("Insufficient data for {metric}: {points} point(s), need at least {required}")]
    InsufficientData {
        metric: String,
        points: usize,
        required: usize,
    },
}

/// Errors related to mitigation plan and action item lifecycle
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MitigationError {
    #[error("Invalid state transition for {entity} {id}: {from} -> {to} ({reason})")]
    InvalidStateTransition {
        entity: String,
        id: String,
        from: String,
        to: String,
        reason: String,
    },

    #[error("Action item {item_id} not found in plan {plan_id}")]
    ActionItemNotFound { plan_id: String, item_id: String },

    #[error("Due date {due_date} precedes plan creation date {created}")]
    InvalidDueDate { due_date: String, created: String },

    #[error("Invalid target value for {team}/{metric}: {value}")]
    InvalidTarget {
        team: String,
        metric: String,
        value: f64,
    },
}

/// Errors related to plan persistence adapters
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RepositoryError {
    #[error("Mitigation plan not found: {plan_id}")]
    PlanNotFound { plan_id: String },

    #[error("Version conflict on plan {plan_id}: expected v{expected}, stored v{actual}")]
    VersionConflict {
        plan_id: String,
        expected: u64,
        actual: u64,
    },
}
