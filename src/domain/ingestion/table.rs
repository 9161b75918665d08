use crate::domain::metrics::record::MetricRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

static EMPTY: Cell = Cell::Empty;

/// Scalar cell value as handed over by a spreadsheet or CSV reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Date(NaiveDate),
    Text(String),
    Empty,
}

impl Cell {
    /// Blank text or no value at all.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Number(_) | Cell::Date(_) => false,
        }
    }

    /// Trimmed textual rendering, `None` for blank cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Number(n) => Some(n.to_string()),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(text) => write!(f, "{}", text),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Empty, Into::into)
    }
}

pub type Row = HashMap<String, Cell>;

/// Ordered columns plus rows keyed by column name.
///
/// Column order is preserved so that every downstream decision (role
/// resolution, candidate metric order) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl RawTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        let mut table = Self::default();
        for column in columns {
            let column = column.into();
            if !table.columns.contains(&column) {
                table.columns.push(column);
            }
        }
        table
    }

    /// Append a row. Keys not yet known become new columns, in sorted order.
    pub fn push_row(&mut self, row: Row) {
        let mut unseen: Vec<&String> = row
            .keys()
            .filter(|key| !self.columns.contains(key))
            .collect();
        unseen.sort();
        let unseen: Vec<String> = unseen.into_iter().cloned().collect();
        self.columns.extend(unseen);
        self.rows.push(row);
    }

    /// Builder-style row insertion from `(column, cell)` pairs.
    pub fn with_row<K, C>(mut self, cells: impl IntoIterator<Item = (K, C)>) -> Self
    where
        K: Into<String>,
        C: Into<Cell>,
    {
        let row = cells
            .into_iter()
            .map(|(key, cell)| (key.into(), cell.into()))
            .collect();
        self.push_row(row);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, column)`; missing entries read as `Cell::Empty`.
    pub fn cell(&self, row: usize, column: &str) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Canonical long-form export using the canonical field names as headers,
    /// storage id and creation time included.
    pub fn from_records(records: &[MetricRecord]) -> Self {
        let mut table = Self::new([
            "team",
            "metric",
            "value",
            "date",
            "category",
            "unit",
            "project",
            "notes",
            "id",
            "created_at",
        ]);
        for record in records {
            table.push_row(Row::from([
                ("team".to_string(), Cell::from(record.team.as_str())),
                ("metric".to_string(), Cell::from(record.metric.as_str())),
                ("value".to_string(), Cell::Number(record.value)),
                ("date".to_string(), Cell::from(record.date)),
                ("category".to_string(), Cell::from(record.category.clone())),
                ("unit".to_string(), Cell::from(record.unit.clone())),
                ("project".to_string(), Cell::from(record.project.clone())),
                ("notes".to_string(), Cell::from(record.notes.clone())),
                ("id".to_string(), Cell::from(record.id.map(|id| id.to_string()))),
                (
                    "created_at".to_string(),
                    Cell::from(record.created_at.map(|at| at.to_rfc3339())),
                ),
            ]));
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_row_extends_columns_deterministically() {
        let table = RawTable::new(["team"]).with_row([
            ("team", Cell::from("A")),
            ("zeta", Cell::from(1.0)),
            ("alpha", Cell::from(2.0)),
        ]);

        assert_eq!(table.columns(), ["team", "alpha", "zeta"]);
    }

    #[test]
    fn test_missing_cell_reads_empty() {
        let table = RawTable::new(["team", "value"]).with_row([("team", "A")]);
        assert_eq!(table.cell(0, "value"), &Cell::Empty);
        assert_eq!(table.cell(5, "team"), &Cell::Empty);
    }

    #[test]
    fn test_blank_detection() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::from("   ").is_blank());
        assert!(!Cell::from(0.0).is_blank());
        assert_eq!(Cell::from("  x ").as_text().as_deref(), Some("x"));
    }

    #[test]
    fn test_from_records_uses_canonical_headers() {
        let records = vec![MetricRecord::new("A", "Velocity", 3.0)];
        let table = RawTable::from_records(&records);
        assert_eq!(table.columns().len(), 8);
        assert_eq!(table.cell(0, "value"), &Cell::Number(3.0));
        assert_eq!(table.cell(0, "date"), &Cell::Empty);
    }
}
