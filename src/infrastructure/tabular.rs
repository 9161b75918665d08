//! CSV adapters for the ingestion pipeline.
//!
//! Reading produces an untyped `RawTable` (every non-empty field is a text
//! cell); coercion and role resolution happen in the domain normalizer.

use crate::domain::ingestion::table::{Cell, RawTable, Row};
use crate::domain::metrics::record::MetricRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Read a headed CSV stream into a raw table.
///
/// Short rows are allowed; missing trailing fields read as empty cells.
pub fn read_csv_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(str::to_string)
        .collect();
    let mut table = RawTable::new(headers.iter().cloned());

    for (index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read CSV row {}", index))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, field)| {
                let cell = if field.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_string())
                };
                (header.clone(), cell)
            })
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

pub fn load_csv_table(path: &Path) -> Result<RawTable> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_csv_table(BufReader::new(file))
        .with_context(|| format!("Failed to parse CSV file {}", path.display()))
}

/// Canonical long-form row, the header set the normalizer maps one to one
#[derive(Serialize)]
struct CanonicalRow<'a> {
    team: &'a str,
    metric: &'a str,
    value: f64,
    date: Option<NaiveDate>,
    category: Option<&'a str>,
    unit: Option<&'a str>,
    project: Option<&'a str>,
    notes: Option<&'a str>,
    id: Option<i64>,
    created_at: Option<DateTime<Utc>>,
}

/// Write records as a canonical long-form CSV.
pub fn write_records_csv<W: Write>(records: &[MetricRecord], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for record in records {
        wtr.serialize(CanonicalRow {
            team: &record.team,
            metric: &record.metric,
            value: record.value,
            date: record.date,
            category: record.category.as_deref(),
            unit: record.unit.as_deref(),
            project: record.project.as_deref(),
            notes: record.notes.as_deref(),
            id: record.id,
            created_at: record.created_at,
        })
        .context("Failed to serialize metric record")?;
    }
    wtr.flush().context("Failed to flush CSV writer")?;
    Ok(())
}
