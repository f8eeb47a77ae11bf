// 🔄 Reshape - raw provider records -> period-indexed StatementTable
//
// Records arrive one per fiscal year (newest first, usually). Output has one
// row per field and one column per year, oldest -> newest, figures scaled.

use crate::error::{ReportError, Result};
use crate::normalize::prettify_label;
use crate::source::RawRecord;
use crate::table::StatementTable;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use log::debug;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

pub const DEFAULT_DATE_FIELD: &str = "date";

/// Provider bookkeeping fields, never line items
pub const METADATA_FIELDS: [&str; 11] = [
    "symbol",
    "reportedCurrency",
    "cik",
    "fillingDate",
    "filingDate",
    "acceptedDate",
    "calendarYear",
    "fiscalYear",
    "period",
    "link",
    "finalLink",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ReshapeOptions {
    pub date_field: String,
    pub scale: u64,
    /// Keep only the newest N periods
    pub max_periods: Option<usize>,
}

impl ReshapeOptions {
    pub fn new(scale: u64) -> Self {
        ReshapeOptions {
            date_field: DEFAULT_DATE_FIELD.to_string(),
            scale,
            max_periods: None,
        }
    }

    pub fn with_max_periods(mut self, periods: usize) -> Self {
        self.max_periods = Some(periods);
        self
    }
}

/// Parse `YYYY-MM-DD`, an RFC 3339 timestamp, or `YYYY-MM-DD HH:MM:SS`
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

// Only consulted once some record carries `period`; a record without one is dropped
fn is_annual(record: &RawRecord) -> bool {
    match record.get("period") {
        Some(Value::String(p)) => matches!(p.to_lowercase().as_str(), "annual" | "fy"),
        _ => false,
    }
}

/// Turn provider records into a table: annual only, oldest -> newest, scaled.
pub fn reshape(records: &[RawRecord], options: &ReshapeOptions) -> Result<StatementTable> {
    let has_period = records.iter().any(|r| r.contains_key("period"));
    let annual: Vec<&RawRecord> = records
        .iter()
        .filter(|r| !has_period || is_annual(r))
        .collect();

    if annual.is_empty() {
        debug!("No annual records to reshape");
        return StatementTable::new(Vec::new());
    }

    // Dated records, then one per year; a later date in the same year wins
    let mut dated: Vec<(NaiveDate, &RawRecord)> = Vec::with_capacity(annual.len());
    for record in annual {
        let raw = record.get(&options.date_field).ok_or_else(|| ReportError::MissingColumn {
            column: options.date_field.clone(),
            available: record.keys().cloned().collect(),
        })?;
        let text = raw.as_str().unwrap_or_default();
        let date = parse_date(text).ok_or_else(|| ReportError::InvalidDate {
            column: options.date_field.clone(),
            value: raw.to_string(),
        })?;
        dated.push((date, record));
    }
    dated.sort_by_key(|(date, _)| *date);

    let mut by_year: BTreeMap<i32, &RawRecord> = BTreeMap::new();
    for (date, record) in &dated {
        by_year.insert(date.year(), record);
    }

    let periods: Vec<String> = by_year.keys().map(|y| y.to_string()).collect();
    let columns: Vec<&RawRecord> = by_year.values().copied().collect();

    // Field order: first appearance across the kept records
    let mut seen = HashSet::new();
    let mut fields: Vec<&str> = Vec::new();
    for record in &columns {
        for key in record.keys() {
            let key = key.as_str();
            if key == options.date_field || METADATA_FIELDS.contains(&key) {
                continue;
            }
            if seen.insert(key) {
                fields.push(key);
            }
        }
    }

    let divisor = options.scale.max(1) as f64;
    let mut table = StatementTable::new(periods)?;

    for field in fields {
        let cells: Vec<Option<&Value>> = columns.iter().map(|r| r.get(field)).collect();

        let has_number = cells.iter().any(|v| matches!(v, Some(Value::Number(_))));
        let has_text = cells
            .iter()
            .any(|v| matches!(v, Some(Value::String(_) | Value::Bool(_) | Value::Array(_) | Value::Object(_))));
        if has_text && !has_number {
            debug!("Dropping non-numeric field '{}'", field);
            continue;
        }

        let values = cells
            .iter()
            .map(|v| v.and_then(Value::as_f64).map(|n| n / divisor))
            .collect();
        table.push_row(prettify_label(field), values)?;
    }

    if let Some(max) = options.max_periods {
        table.retain_latest(max);
    }

    debug!(
        "Reshaped {} records into {} rows x {} periods",
        records.len(),
        table.len(),
        table.periods().len()
    );
    Ok(table)
}
