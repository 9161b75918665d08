use crate::domain::errors::IngestionError;
use crate::domain::ingestion::alias::{CanonicalRole, RoleMapping};
use crate::domain::ingestion::coerce::coerce_value;
use crate::domain::ingestion::table::RawTable;
use serde::Serialize;

/// Classified layout of an input table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InputShape {
    /// Explicit metric-name and value columns, one observation per row.
    Long,
    /// Metric names as headers; carries the candidate metric columns in input order.
    Wide { metric_columns: Vec<String> },
}

/// Outcome of shape detection, including columns that were set aside
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeDecision {
    pub shape: InputShape,
    /// Columns that contribute nothing: unresolved columns for long input;
    /// for wide input, text-only candidates, a metric-name column without
    /// values and per-record storage columns.
    pub ignored_columns: Vec<String>,
}

/// Classify a resolved table as long or wide form.
///
/// Long wins whenever both `metric` and `value` resolved. Otherwise the
/// table is wide when `team` resolved and at least two numeric-bearing
/// candidate columns remain. The decision depends only on the column set
/// and cell contents, never on iteration order of hashed containers.
pub fn detect_shape(
    table: &RawTable,
    mapping: &RoleMapping,
) -> Result<ShapeDecision, IngestionError> {
    let metric = mapping.column_for(CanonicalRole::Metric);
    let value = mapping.column_for(CanonicalRole::Value);

    if let (Some(metric), Some(value)) = (metric, value) {
        if metric != value {
            return Ok(ShapeDecision {
                shape: InputShape::Long,
                ignored_columns: mapping.unresolved().to_vec(),
            });
        }
    }

    if !mapping.has(CanonicalRole::Team) {
        return Err(unrecognized(table, "no team column for wide-form input"));
    }

    let mut metric_columns = Vec::new();
    let mut ignored_columns = Vec::new();
    for column in table.columns() {
        let role = mapping.role_of(column);
        // A lone value-role column without a metric column is just another metric header.
        let candidate = role.is_none() || (role == Some(CanonicalRole::Value) && metric.is_none());
        if candidate && is_numeric_bearing(table, column) {
            metric_columns.push(column.clone());
        } else if candidate
            || role == Some(CanonicalRole::Metric)
            || role.is_some_and(|role| role.is_storage_field())
        {
            ignored_columns.push(column.clone());
        }
    }

    if metric_columns.len() < 2 {
        return Err(unrecognized(
            table,
            &format!(
                "neither long form (metric + value) nor wide form (team + 2 numeric columns, found {})",
                metric_columns.len()
            ),
        ));
    }

    Ok(ShapeDecision {
        shape: InputShape::Wide { metric_columns },
        ignored_columns,
    })
}

/// At least one non-blank cell coerces to a finite number. Vacuously true for empty tables.
fn is_numeric_bearing(table: &RawTable, column: &str) -> bool {
    table.is_empty()
        || (0..table.row_count()).any(|row| coerce_value(table.cell(row, column)).is_some())
}

fn unrecognized(table: &RawTable, reason: &str) -> IngestionError {
    IngestionError::UnrecognizedSchema {
        reason: reason.to_string(),
        columns: table.columns().to_vec(),
    }
}
