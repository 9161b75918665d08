use crate::domain::config::normalization_config::{NormalizationConfig, RejectionPolicy};
use crate::domain::errors::IngestionError;
use crate::domain::ingestion::alias::{CanonicalRole, RoleMapping, SynonymTable, resolve_columns};
use crate::domain::ingestion::coerce::{
    DateCell, coerce_id, coerce_value, parse_date, parse_timestamp,
};
use crate::domain::ingestion::shape::{InputShape, detect_shape};
use crate::domain::ingestion::table::{Cell, RawTable};
use crate::domain::metrics::naming::collapse_whitespace;
use crate::domain::metrics::record::MetricRecord;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

/// Why a row or emitted record was rejected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RejectionReason {
    InvalidValue { raw: String },
    MissingTeam,
    MissingMetric,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::InvalidValue { raw } if raw.is_empty() => write!(f, "empty value"),
            RejectionReason::InvalidValue { raw } => write!(f, "non-numeric value '{}'", raw),
            RejectionReason::MissingTeam => write!(f, "missing team"),
            RejectionReason::MissingMetric => write!(f, "missing metric"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    /// Zero-based index into the table's rows.
    pub row: usize,
    pub column: String,
    pub reason: RejectionReason,
}

impl Rejection {
    fn into_error(self) -> IngestionError {
        match self.reason {
            RejectionReason::InvalidValue { raw } => IngestionError::InvalidValue {
                row: self.row,
                column: self.column,
                raw,
            },
            RejectionReason::MissingTeam => IngestionError::MissingField {
                row: self.row,
                field: CanonicalRole::Team.to_string(),
                column: self.column,
            },
            RejectionReason::MissingMetric => IngestionError::MissingField {
                row: self.row,
                field: CanonicalRole::Metric.to_string(),
                column: self.column,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationReport {
    pub accepted_count: usize,
    pub rejected_count: usize,
    pub warnings: Vec<String>,
    pub rejections: Vec<Rejection>,
}

/// Canonical records plus everything decided while producing them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalized {
    pub records: Vec<MetricRecord>,
    pub report: NormalizationReport,
    pub shape: InputShape,
    pub mapping: RoleMapping,
}

/// Converts raw long- or wide-form tables into canonical `MetricRecord`s.
///
/// Stateless: a single instance can normalize any number of tables, from
/// any number of threads.
#[derive(Debug, Clone)]
pub struct Normalizer<'a> {
    config: &'a NormalizationConfig,
    synonyms: &'a SynonymTable,
}

/// Identifier fields read once per source row
struct RowContext {
    id: Option<i64>,
    team: Option<String>,
    date: Option<NaiveDate>,
    category: Option<String>,
    unit: Option<String>,
    project: Option<String>,
    notes: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl RowContext {
    fn record(&self, team: &str, metric: String, value: f64) -> MetricRecord {
        MetricRecord {
            id: self.id,
            team: team.to_string(),
            metric,
            value,
            date: self.date,
            category: self.category.clone(),
            unit: self.unit.clone(),
            project: self.project.clone(),
            notes: self.notes.clone(),
            created_at: self.created_at,
        }
    }
}

impl<'a> Normalizer<'a> {
    pub fn new(config: &'a NormalizationConfig, synonyms: &'a SynonymTable) -> Self {
        Self { config, synonyms }
    }

    /// Resolve, classify and reshape `table` into canonical records.
    ///
    /// # Errors
    ///
    /// - `UnrecognizedSchema` when no team/value-bearing columns resolve or
    ///   the shape cannot be classified
    /// - `InvalidValue` / `MissingField` for the first bad cell under
    ///   `RejectionPolicy::AbortAll`
    pub fn normalize(&self, table: &RawTable) -> Result<Normalized, IngestionError> {
        let mapping = resolve_columns(table.columns(), self.synonyms)?;
        let decision = detect_shape(table, &mapping)?;

        let mut out = Collector::new(self.config.policy);
        for column in &decision.ignored_columns {
            let why = match (&decision.shape, mapping.role_of(column)) {
                (InputShape::Long, _) => "is not mapped to any role",
                (InputShape::Wide { .. }, Some(CanonicalRole::Metric)) => {
                    "names metrics but no value column was found"
                }
                (InputShape::Wide { .. }, Some(role)) if role.is_storage_field() => {
                    "identifies single stored records and does not apply to wide input"
                }
                (InputShape::Wide { .. }, _) => "has no numeric cells",
            };
            out.warnings
                .push(format!("column '{}' {} and was ignored", column, why));
        }

        let mut blank_rows = 0;
        for row in 0..table.row_count() {
            if table.columns().iter().all(|c| table.cell(row, c).is_blank()) {
                blank_rows += 1;
                continue;
            }
            let storage = decision.shape == InputShape::Long;
            let context = self.row_context(table, &mapping, row, storage, &mut out.warnings);
            match &decision.shape {
                InputShape::Long => self.emit_long(table, &mapping, row, &context, &mut out)?,
                InputShape::Wide { metric_columns } => {
                    self.emit_wide(table, &mapping, metric_columns, row, &context, &mut out)?
                }
            }
        }
        if blank_rows > 0 {
            out.warnings.push(format!("skipped {} blank row(s)", blank_rows));
        }

        Ok(Normalized {
            report: NormalizationReport {
                accepted_count: out.records.len(),
                rejected_count: out.rejections.len(),
                warnings: out.warnings,
                rejections: out.rejections,
            },
            records: out.records,
            shape: decision.shape,
            mapping,
        })
    }

    fn row_context(
        &self,
        table: &RawTable,
        mapping: &RoleMapping,
        row: usize,
        storage: bool,
        warnings: &mut Vec<String>,
    ) -> RowContext {
        let text = |role: CanonicalRole| {
            mapping
                .column_for(role)
                .and_then(|column| table.cell(row, column).as_text())
        };

        let date = match mapping.column_for(CanonicalRole::Date) {
            Some(column) => match parse_date(table.cell(row, column), &self.config.date_formats) {
                DateCell::Parsed(date) => Some(date),
                DateCell::Absent => None,
                DateCell::Unparseable(raw) => {
                    warnings.push(format!(
                        "row {}: unparseable date '{}' in column '{}', left empty",
                        row, raw, column
                    ));
                    None
                }
            },
            None => None,
        };

        // Storage fields describe one stored record, so only long rows carry them
        let (id, created_at) = if storage {
            (
                read_storage_cell(table, mapping, row, CanonicalRole::Id, coerce_id, warnings),
                read_storage_cell(
                    table,
                    mapping,
                    row,
                    CanonicalRole::CreatedAt,
                    parse_timestamp,
                    warnings,
                ),
            )
        } else {
            (None, None)
        };

        RowContext {
            id,
            team: text(CanonicalRole::Team).map(|t| collapse_whitespace(&t)),
            date,
            category: text(CanonicalRole::Category),
            unit: text(CanonicalRole::Unit),
            project: text(CanonicalRole::Project),
            notes: text(CanonicalRole::Notes),
            created_at,
        }
    }

    fn emit_long(
        &self,
        table: &RawTable,
        mapping: &RoleMapping,
        row: usize,
        context: &RowContext,
        out: &mut Collector,
    ) -> Result<(), IngestionError> {
        // Both columns are present for long input
        let metric_column = mapping.column_for(CanonicalRole::Metric).unwrap_or_default();
        let value_column = mapping.column_for(CanonicalRole::Value).unwrap_or_default();

        let Some(team) = &context.team else {
            return out.reject(row, team_column(mapping), RejectionReason::MissingTeam);
        };
        let Some(metric) = table
            .cell(row, metric_column)
            .as_text()
            .map(|m| collapse_whitespace(&m))
        else {
            return out.reject(row, metric_column, RejectionReason::MissingMetric);
        };
        let cell = table.cell(row, value_column);
        match coerce_value(cell) {
            Some(value) => {
                out.records.push(context.record(team, metric, value));
                Ok(())
            }
            None => out.reject(
                row,
                value_column,
                RejectionReason::InvalidValue {
                    raw: cell.to_string(),
                },
            ),
        }
    }

    fn emit_wide(
        &self,
        table: &RawTable,
        mapping: &RoleMapping,
        metric_columns: &[String],
        row: usize,
        context: &RowContext,
        out: &mut Collector,
    ) -> Result<(), IngestionError> {
        let Some(team) = &context.team else {
            return out.reject(row, team_column(mapping), RejectionReason::MissingTeam);
        };
        for column in metric_columns {
            let cell = table.cell(row, column);
            match coerce_value(cell) {
                Some(value) => {
                    out.records
                        .push(context.record(team, collapse_whitespace(column), value));
                }
                None => out.reject(
                    row,
                    column,
                    RejectionReason::InvalidValue {
                        raw: cell.to_string(),
                    },
                )?,
            }
        }
        Ok(())
    }
}

/// Unreadable cells warn and stay empty.
fn read_storage_cell<T>(
    table: &RawTable,
    mapping: &RoleMapping,
    row: usize,
    role: CanonicalRole,
    parse: impl Fn(&Cell) -> Option<T>,
    warnings: &mut Vec<String>,
) -> Option<T> {
    let column = mapping.column_for(role)?;
    let cell = table.cell(row, column);
    if cell.is_blank() {
        return None;
    }
    let parsed = parse(cell);
    if parsed.is_none() {
        warnings.push(format!(
            "row {}: unreadable {} '{}' in column '{}', left empty",
            row, role, cell, column
        ));
    }
    parsed
}

fn team_column(mapping: &RoleMapping) -> &str {
    mapping.column_for(CanonicalRole::Team).unwrap_or_default()
}

struct Collector {
    policy: RejectionPolicy,
    records: Vec<MetricRecord>,
    rejections: Vec<Rejection>,
    warnings: Vec<String>,
}

impl Collector {
    fn new(policy: RejectionPolicy) -> Self {
        Self {
            policy,
            records: Vec::new(),
            rejections: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn reject(
        &mut self,
        row: usize,
        column: &str,
        reason: RejectionReason,
    ) -> Result<(), IngestionError> {
        let rejection = Rejection {
            row,
            column: column.to_string(),
            reason,
        };
        match self.policy {
            RejectionPolicy::AbortAll => Err(rejection.into_error()),
            RejectionPolicy::RejectRow => {
                self.rejections.push(rejection);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn normalize(table: &RawTable, policy: RejectionPolicy) -> Result<Normalized, IngestionError> {
        let config = NormalizationConfig::default().with_policy(policy);
        let synonyms = SynonymTable::baseline();
        Normalizer::new(&config, &synonyms).normalize(table)
    }

    #[test]
    fn test_long_form_maps_fields() {
        let table = RawTable::new(["Team Name", "KPI", "Score", "Date", "Unit"]).with_row([
            ("Team Name", Cell::from(" TeamA ")),
            ("KPI", Cell::from("Velocity")),
            ("Score", Cell::from("25")),
            ("Date", Cell::from("2024-01-01")),
            ("Unit", Cell::from("points")),
        ]);

        let normalized = normalize(&table, RejectionPolicy::RejectRow).unwrap();

        assert_eq!(normalized.shape, InputShape::Long);
        assert_eq!(
            normalized.records,
            vec![
                MetricRecord::new("TeamA", "Velocity", 25.0)
                    .with_date(ymd(2024, 1, 1))
                    .with_unit("points")
            ]
        );
        assert_eq!(normalized.report.accepted_count, 1);
        assert_eq!(normalized.report.rejected_count, 0);
    }

    #[test]
    fn test_long_form_rejects_bad_rows_and_counts_them() {
        let table = RawTable::new(["team", "metric", "value"])
            .with_row([("team", "A"), ("metric", "Velocity"), ("value", "25")])
            .with_row([("team", "A"), ("metric", "Velocity"), ("value", "n/a")])
            .with_row([("team", ""), ("metric", "Velocity"), ("value", "3")])
            .with_row([("team", "B"), ("metric", " "), ("value", "3")]);

        let normalized = normalize(&table, RejectionPolicy::RejectRow).unwrap();
        let report = &normalized.report;

        assert_eq!(report.accepted_count, 1);
        assert_eq!(report.rejected_count, 3);
        assert_eq!(report.rejections[0].row, 1);
        assert_eq!(
            report.rejections[0].reason,
            RejectionReason::InvalidValue {
                raw: "n/a".to_string()
            }
        );
        assert_eq!(report.rejections[1].reason, RejectionReason::MissingTeam);
        assert_eq!(report.rejections[2].reason, RejectionReason::MissingMetric);
    }

    #[test]
    fn test_abort_all_fails_on_first_invalid_value() {
        let table = RawTable::new(["team", "metric", "value"])
            .with_row([("team", "A"), ("metric", "Velocity"), ("value", "25")])
            .with_row([("team", "A"), ("metric", "Velocity"), ("value", "oops")]);

        let err = normalize(&table, RejectionPolicy::AbortAll).unwrap_err();

        assert_eq!(
            err,
            IngestionError::InvalidValue {
                row: 1,
                column: "value".to_string(),
                raw: "oops".to_string(),
            }
        );
    }

    #[test]
    fn test_wide_form_rejects_single_cell_only() {
        let table = RawTable::new(["team", "Velocity", "Quality"])
            .with_row([
                ("team", Cell::from("A")),
                ("Velocity", Cell::from(25.0)),
                ("Quality", Cell::from("bad")),
            ])
            .with_row([
                ("team", Cell::from("B")),
                ("Velocity", Cell::from(30.0)),
                ("Quality", Cell::from(80.0)),
            ]);

        let normalized = normalize(&table, RejectionPolicy::RejectRow).unwrap();

        assert_eq!(
            normalized.records,
            vec![
                MetricRecord::new("A", "Velocity", 25.0),
                MetricRecord::new("B", "Velocity", 30.0),
                MetricRecord::new("B", "Quality", 80.0),
            ]
        );
        assert_eq!(normalized.report.rejected_count, 1);
        assert_eq!(normalized.report.rejections[0].column, "Quality");
    }

    #[test]
    fn test_wide_headers_are_whitespace_normalized() {
        let table = RawTable::new(["team", "  Cycle   Time ", "Velocity"]).with_row([
            ("team", Cell::from("A")),
            ("  Cycle   Time ", Cell::from(4.0)),
            ("Velocity", Cell::from(20.0)),
        ]);

        let normalized = normalize(&table, RejectionPolicy::RejectRow).unwrap();
        let metrics: Vec<&str> = normalized.records.iter().map(|r| r.metric.as_str()).collect();
        assert_eq!(metrics, vec!["Cycle Time", "Velocity"]);
    }

    #[test]
    fn test_unparseable_date_warns_and_continues() {
        let table = RawTable::new(["team", "metric", "value", "date"]).with_row([
            ("team", "A"),
            ("metric", "Velocity"),
            ("value", "25"),
            ("date", "next tuesday"),
        ]);

        let normalized = normalize(&table, RejectionPolicy::AbortAll).unwrap();

        assert_eq!(normalized.records.len(), 1);
        assert_eq!(normalized.records[0].date, None);
        assert_eq!(normalized.report.warnings.len(), 1);
        assert!(normalized.report.warnings[0].contains("next tuesday"));
    }

    #[test]
    fn test_blank_rows_are_skipped_with_warning() {
        let table = RawTable::new(["team", "metric", "value"])
            .with_row([("team", "A"), ("metric", "Velocity"), ("value", "1")])
            .with_row([("team", ""), ("metric", ""), ("value", " ")]);

        let normalized = normalize(&table, RejectionPolicy::AbortAll).unwrap();

        assert_eq!(normalized.report.accepted_count, 1);
        assert_eq!(normalized.report.rejected_count, 0);
        assert_eq!(normalized.report.warnings, vec!["skipped 1 blank row(s)"]);
    }

    #[test]
    fn test_unrecognized_schema_propagates() {
        let table = RawTable::new(["who", "what"]).with_row([("who", "A"), ("what", "B")]);
        let err = normalize(&table, RejectionPolicy::RejectRow).unwrap_err();
        assert!(matches!(err, IngestionError::UnrecognizedSchema { .. }));
    }

    #[test]
    fn test_wide_row_without_team_is_rejected_once() {
        let table = RawTable::new(["team", "Velocity", "Quality", "Focus"])
            .with_row([
                ("team", Cell::from("A")),
                ("Velocity", Cell::from(25.0)),
                ("Quality", Cell::from(80.0)),
                ("Focus", Cell::from(0.6)),
            ])
            .with_row([
                ("team", Cell::Empty),
                ("Velocity", Cell::from(30.0)),
                ("Quality", Cell::from(70.0)),
                ("Focus", Cell::from(0.4)),
            ]);

        let normalized = normalize(&table, RejectionPolicy::RejectRow).unwrap();

        assert_eq!(normalized.report.accepted_count, 3);
        assert_eq!(normalized.report.rejected_count, 1);
        assert_eq!(
            normalized.report.rejections,
            vec![Rejection {
                row: 1,
                column: "team".to_string(),
                reason: RejectionReason::MissingTeam,
            }]
        );
    }

    #[test]
    fn test_wide_form_warns_about_dropped_metric_column() {
        let table = RawTable::new(["team", "metric", "Velocity", "Quality"]).with_row([
            ("team", Cell::from("A")),
            ("metric", Cell::from("sprint 12")),
            ("Velocity", Cell::from(25.0)),
            ("Quality", Cell::from(80.0)),
        ]);

        let normalized = normalize(&table, RejectionPolicy::RejectRow).unwrap();

        assert_eq!(normalized.records.len(), 2);
        assert_eq!(
            normalized.report.warnings,
            vec!["column 'metric' names metrics but no value column was found and was ignored"]
        );
    }

    #[test]
    fn test_long_form_carries_storage_fields() {
        let created = ymd(2024, 2, 1).and_hms_opt(9, 15, 0).unwrap().and_utc();
        let table = RawTable::new(["id", "team", "metric", "value", "created_at"])
            .with_row([
                ("id", Cell::from("17")),
                ("team", Cell::from("A")),
                ("metric", Cell::from("Velocity")),
                ("value", Cell::from(25.0)),
                ("created_at", Cell::from("2024-02-01T09:15:00Z")),
            ])
            .with_row([
                ("id", Cell::from("x1")),
                ("team", Cell::from("B")),
                ("metric", Cell::from("Velocity")),
                ("value", Cell::from(21.0)),
                ("created_at", Cell::Empty),
            ]);

        let normalized = normalize(&table, RejectionPolicy::RejectRow).unwrap();

        assert_eq!(normalized.records[0].id, Some(17));
        assert_eq!(normalized.records[0].created_at, Some(created));
        assert_eq!(normalized.records[1].id, None);
        assert_eq!(normalized.records[1].created_at, None);
        assert_eq!(
            normalized.report.warnings,
            vec!["row 1: unreadable id 'x1' in column 'id', left empty"]
        );
    }
}
