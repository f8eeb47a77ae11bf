// 📊 Statement Table - period-indexed line items
// Rows keep provider order, columns are fiscal periods oldest -> newest

use crate::error::{ReportError, Result};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementRow {
    /// Display label (prettified, not necessarily unique)
    pub label: String,

    /// One slot per period; `None` = not reported that period
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatementTable {
    periods: Vec<String>,
    rows: Vec<StatementRow>,
}

impl StatementTable {
    /// Periods must be strictly ascending (numerically when they are years).
    pub fn new(periods: Vec<String>) -> Result<Self> {
        if let Some(pair) = periods
            .windows(2)
            .find(|w| compare_periods(&w[0], &w[1]) != Ordering::Less)
        {
            return Err(ReportError::Shape(format!(
                "periods must be strictly ascending, found '{}' before '{}'",
                pair[0], pair[1]
            )));
        }

        Ok(StatementTable {
            periods,
            rows: Vec::new(),
        })
    }

    pub fn push_row(&mut self, label: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let label = label.into();
        if values.len() != self.periods.len() {
            return Err(ReportError::Shape(format!(
                "row '{}' has {} values for {} periods",
                label,
                values.len(),
                self.periods.len()
            )));
        }

        self.rows.push(StatementRow { label, values });
        Ok(())
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn rows(&self) -> &[StatementRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&StatementRow> {
        self.rows.get(index)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.label.as_str())
    }

    /// Value at (row, period column); `None` when missing or out of range
    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.values.get(column).copied().flatten())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only the newest `count` periods
    pub fn retain_latest(&mut self, count: usize) {
        if self.periods.len() <= count {
            return;
        }

        let drop = self.periods.len() - count;
        self.periods.drain(..drop);
        for row in &mut self.rows {
            row.values.drain(..drop);
        }
    }

    /// Read-only view over a subset of rows, in the given order
    pub fn view(&self, rows: Vec<usize>) -> TableView<'_> {
        TableView { table: self, rows }
    }
}

// ============================================================================
// TABLE VIEW
// ============================================================================

/// Rows of a table restricted to one section. Borrows, never copies values.
#[derive(Debug, Clone)]
pub struct TableView<'a> {
    table: &'a StatementTable,
    rows: Vec<usize>,
}

impl<'a> TableView<'a> {
    pub fn periods(&self) -> &'a [String] {
        self.table.periods()
    }

    /// Positions of the viewed rows in the underlying table
    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a StatementRow> + '_ {
        let table = self.table;
        self.rows.iter().filter_map(move |&i| table.row(i))
    }

    pub fn labels(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.rows().map(|r| r.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Year labels compare as numbers, anything else as text
pub fn compare_periods(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}
