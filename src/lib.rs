// Statement Report - Core Library
// Annual statements -> classified sections -> styled workbook.
// Exposes all modules for use in the CLI and tests.

pub mod error;
pub mod normalize;  // Label normalization + prettified field names
pub mod statement;  // The three statement kinds
pub mod rules;      // Classification rules + rule book
pub mod table;      // Period-indexed statement table
pub mod classify;   // First-match-wins bucketing
pub mod sections;   // Ordered sections per statement
pub mod grid;       // Cell grid with style tags
pub mod render;     // Layout + styling pass
pub mod config;
pub mod source;     // Provider client + offline JSON source
pub mod reshape;    // Raw records -> table
pub mod workbook;   // .xlsx output, atomic
pub mod assemble;   // Whole-report pipeline

// Re-export commonly used types
pub use error::{ReportError, Result};
pub use statement::StatementKind;
pub use rules::{ClassificationRule, RuleBook, RuleMatch, RuleSet};
pub use table::{StatementRow, StatementTable, TableView};
pub use classify::{classify, classify_label, Bucket, BucketMap};
pub use sections::{build_sections, OrderedSections, Section};
pub use grid::{Cell, CellValue, Fill, Grid, Role, StyleTag};
pub use render::{render_sheet, FreezePanes, RenderedSheet, SheetLayout};
pub use config::{ProviderConfig, ReportConfig};
pub use source::{FmpClient, JsonDirSource, RawRecord, StatementSource};
pub use reshape::{reshape, ReshapeOptions};
pub use workbook::{build_workbook, write_workbook};
pub use assemble::{assemble_report, build_statement, generate_report, ReportSummary, SheetSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
