use crate::domain::ingestion::table::Cell;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Default ordered list of accepted calendar formats.
pub const DEFAULT_DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%b %d, %Y",
    "%d %b %Y",
];

/// Outcome of reading a date cell
#[derive(Debug, Clone, PartialEq)]
pub enum DateCell {
    Absent,
    Parsed(NaiveDate),
    Unparseable(String),
}

/// Coerce a cell to a finite float. Text is trimmed before parsing.
pub fn coerce_value(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Text(text) => text.trim().parse::<f64>().ok()?,
        Cell::Empty | Cell::Date(_) => return None,
    };
    value.is_finite().then_some(value)
}

/// Coerce a storage id: integral numbers or integer text.
pub fn coerce_id(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 => Some(*n as i64),
        Cell::Text(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Read a creation timestamp. RFC 3339 text keeps its instant; naive
/// date-times and bare dates are taken as UTC.
pub fn parse_timestamp(cell: &Cell) -> Option<DateTime<Utc>> {
    match cell {
        Cell::Date(date) => Some(date.and_time(NaiveTime::MIN).and_utc()),
        Cell::Text(text) => {
            let raw = text.trim();
            if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
                return Some(instant.with_timezone(&Utc));
            }
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|naive| naive.and_utc())
        }
        Cell::Number(_) | Cell::Empty => None,
    }
}

/// Read a date cell, trying `formats` in order, then RFC 3339.
pub fn parse_date<S: AsRef<str>>(cell: &Cell, formats: &[S]) -> DateCell {
    match cell {
        Cell::Empty => DateCell::Absent,
        Cell::Date(date) => DateCell::Parsed(*date),
        Cell::Number(n) => DateCell::Unparseable(n.to_string()),
        Cell::Text(text) => {
            let raw = text.trim();
            if raw.is_empty() {
                return DateCell::Absent;
            }
            parse_date_text(raw, formats)
                .map(DateCell::Parsed)
                .unwrap_or_else(|| DateCell::Unparseable(raw.to_string()))
        }
    }
}

fn parse_date_text<S: AsRef<str>>(raw: &str, formats: &[S]) -> Option<NaiveDate> {
    for format in formats {
        let format = format.as_ref();
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(datetime.date());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|datetime| datetime.date_naive())
}
