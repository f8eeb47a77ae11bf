// 🧩 Report Assembly - source -> three styled sheets -> one workbook
//
// Statements are processed in a fixed order (income, balance sheet, cash flow).
// Any failure aborts the whole run; nothing is written unless every sheet built.

use crate::config::ReportConfig;
use crate::error::Result;
use crate::render::{render_sheet, RenderedSheet};
use crate::reshape::{reshape, ReshapeOptions};
use crate::rules::RuleBook;
use crate::sections::build_sections;
use crate::source::StatementSource;
use crate::statement::StatementKind;
use crate::workbook::write_workbook;
use log::info;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetSummary {
    pub name: String,
    pub periods: Vec<String>,
    pub line_items: usize,
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub output: PathBuf,
    pub sheets: Vec<SheetSummary>,
}

impl ReportSummary {
    /// Short human-readable recap, one line per sheet
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for sheet in &self.sheets {
            let span = match (sheet.periods.first(), sheet.periods.last()) {
                (Some(first), Some(last)) if first != last => format!("{}-{}", first, last),
                (Some(only), _) => only.clone(),
                _ => "no periods".to_string(),
            };
            let _ = writeln!(
                out,
                "  {:<18} {:>3} line items in {} sections ({})",
                sheet.name,
                sheet.line_items,
                sheet.sections.len(),
                span
            );
        }
        out
    }
}

/// Build one statement's sheet. Errors carry the statement name.
pub fn build_statement(
    source: &dyn StatementSource,
    config: &ReportConfig,
    rules: &RuleBook,
    kind: StatementKind,
) -> Result<(RenderedSheet, SheetSummary)> {
    let run = || -> Result<(RenderedSheet, SheetSummary)> {
        let records = source.fetch(kind)?;
        let options = ReshapeOptions::new(config.scale).with_max_periods(config.years);
        let table = reshape(&records, &options)?;

        let rule_set = rules.get(kind);
        let sections = build_sections(&table, rule_set);

        let sheet = render_sheet(
            kind.sheet_name(),
            &kind.title(&config.ticker),
            &config.units_label(),
            table.periods(),
            &sections,
        );

        let summary = SheetSummary {
            name: kind.sheet_name().to_string(),
            periods: table.periods().to_vec(),
            line_items: sections.row_count(),
            sections: sections.names().iter().map(|s| s.to_string()).collect(),
        };
        Ok((sheet, summary))
    };

    let (sheet, summary) = run().map_err(|e| e.in_statement(kind.sheet_name()))?;
    info!(
        "{}: {} line items, {} sections, {} periods",
        summary.name,
        summary.line_items,
        summary.sections.len(),
        summary.periods.len()
    );
    Ok((sheet, summary))
}

/// All three sheets in workbook order, without touching the filesystem.
pub fn assemble_report(
    source: &dyn StatementSource,
    config: &ReportConfig,
    rules: &RuleBook,
) -> Result<(Vec<RenderedSheet>, Vec<SheetSummary>)> {
    config.validate()?;
    info!("Building report for {} from {}", config.ticker, source.name());

    let mut sheets = Vec::with_capacity(3);
    let mut summaries = Vec::with_capacity(3);
    for kind in StatementKind::all() {
        let (sheet, summary) = build_statement(source, config, rules, kind)?;
        sheets.push(sheet);
        summaries.push(summary);
    }
    Ok((sheets, summaries))
}

/// Fetch, classify, render and save the report at `config.output`.
pub fn generate_report(
    source: &dyn StatementSource,
    config: &ReportConfig,
    rules: &RuleBook,
) -> Result<ReportSummary> {
    let (sheets, summaries) = assemble_report(source, config, rules)?;
    write_workbook(&sheets, &config.output)?;

    Ok(ReportSummary {
        output: config.output.clone(),
        sheets: summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::grid::CellValue;
    use crate::source::RawRecord;
    use serde_json::{json, Value};

    struct FixtureSource {
        fail_on: Option<StatementKind>,
    }

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    impl StatementSource for FixtureSource {
        fn fetch(&self, kind: StatementKind) -> Result<Vec<RawRecord>> {
            if self.fail_on == Some(kind) {
                return Err(ReportError::AccessDenied {
                    endpoint: kind.endpoint().to_string(),
                    body: "Restricted Endpoint".to_string(),
                });
            }
            let records = match kind {
                StatementKind::Income => vec![
                    record(json!({ "date": "2023-09-30", "period": "FY", "revenue": 32653000, "netIncome": 17273000 })),
                    record(json!({ "date": "2022-09-30", "period": "FY", "revenue": 29310000, "netIncome": 14957000 })),
                ],
                StatementKind::BalanceSheet => vec![record(json!({
                    "date": "2023-09-30", "cashAndCashEquivalents": 16286000, "goodwill": 17997000,
                    "totalLiabilities": 51500000, "mysteryField": 5000
                }))],
                StatementKind::CashFlow => vec![record(json!({
                    "date": "2023-09-30", "netCashProvidedByOperatingActivities": 20755000,
                    "capitalExpenditure": -1059000
                }))],
            };
            Ok(records)
        }

        fn name(&self) -> &str {
            "fixture"
        }
    }

    #[test]
    fn test_three_sheets_in_fixed_order() {
        let source = FixtureSource { fail_on: None };
        let config = ReportConfig::new("V");
        let (sheets, summaries) = assemble_report(&source, &config, &RuleBook::builtin()).unwrap();

        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Income Statement", "Balance Sheet", "Cash Flow"]);
        assert_eq!(summaries[0].periods, vec!["2022", "2023"]);
        assert_eq!(summaries[0].sections, vec!["Revenue", "Net Income"]);
    }

    #[test]
    fn test_title_and_scaled_values() {
        let source = FixtureSource { fail_on: None };
        let config = ReportConfig::new("V").with_scale(1_000);
        let (sheet, _) =
            build_statement(&source, &config, &RuleBook::builtin(), StatementKind::Income).unwrap();

        assert_eq!(
            sheet.grid.get(1, 1).map(|c| &c.value),
            Some(&CellValue::Text("V — Income Statement".to_string()))
        );
        // Banner "Revenue" at row 3, line item at row 4, 2023 in column 3
        assert_eq!(sheet.grid.get(4, 3).and_then(|c| c.value.as_number()), Some(32653.0));
    }

    #[test]
    fn test_unmatched_fields_land_in_other_section() {
        let source = FixtureSource { fail_on: None };
        let config = ReportConfig::default();
        let (_, summary) =
            build_statement(&source, &config, &RuleBook::builtin(), StatementKind::BalanceSheet).unwrap();
        assert_eq!(summary.sections.last().map(String::as_str), Some("Other Balance Sheet Items"));
        assert_eq!(summary.line_items, 4);
    }

    #[test]
    fn test_failure_names_the_statement() {
        let source = FixtureSource { fail_on: Some(StatementKind::CashFlow) };
        let err = assemble_report(&source, &ReportConfig::default(), &RuleBook::builtin()).unwrap_err();

        match err {
            ReportError::Statement { statement, source } => {
                assert_eq!(statement, "Cash Flow");
                assert!(matches!(*source, ReportError::AccessDenied { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_config_rejected_before_fetching() {
        let source = FixtureSource { fail_on: Some(StatementKind::Income) };
        let config = ReportConfig::default().with_years(0);
        let err = assemble_report(&source, &config, &RuleBook::builtin()).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_summary_lists_each_sheet() {
        let source = FixtureSource { fail_on: None };
        let (_, sheets) = assemble_report(&source, &ReportConfig::default(), &RuleBook::builtin()).unwrap();
        let report = ReportSummary {
            output: PathBuf::from("V_Financials_Styled.xlsx"),
            sheets,
        };
        let text = report.summary();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("2022-2023"));
        assert!(text.contains("Cash Flow"));
    }
}
