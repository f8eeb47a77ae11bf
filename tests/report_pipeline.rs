// End-to-end: saved provider responses -> workbook on disk

use serde_json::json;
use statement_report::{generate_report, JsonDirSource, ReportConfig, ReportError, RuleBook};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn scratch_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!(
        "statement-report-it-{}-{}-{}",
        name,
        std::process::id(),
        nanos
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_json(dir: &Path, endpoint: &str, value: serde_json::Value) {
    fs::write(dir.join(format!("{}.json", endpoint)), value.to_string()).unwrap();
}

fn write_fixtures(dir: &Path, with_balance_sheet: bool) {
    write_json(
        dir,
        "income-statement",
        json!([
            {
                "date": "2023-09-30", "symbol": "V", "reportedCurrency": "USD", "period": "FY",
                "revenue": 32653000000i64, "costOfRevenue": 6334000000i64, "grossProfit": 26319000000i64,
                "sellingGeneralAndAdministrativeExpenses": 1500000000i64, "operatingIncome": 21000000000i64,
                "interestExpense": 644000000i64, "incomeBeforeTax": 20604000000i64,
                "incomeTaxExpense": 3331000000i64, "netIncome": 17273000000i64, "eps": 8.29
            },
            {
                "date": "2022-09-30", "symbol": "V", "reportedCurrency": "USD", "period": "FY",
                "revenue": 29310000000i64, "costOfRevenue": 5438000000i64, "grossProfit": 23872000000i64,
                "sellingGeneralAndAdministrativeExpenses": 1400000000i64, "operatingIncome": 18813000000i64,
                "interestExpense": 538000000i64, "incomeBeforeTax": 17798000000i64,
                "incomeTaxExpense": 2840000000i64, "netIncome": 14957000000i64, "eps": 7.0
            }
        ]),
    );
    if with_balance_sheet {
        write_json(
            dir,
            "balance-sheet-statement",
            json!([{
                "date": "2023-09-30", "period": "FY", "cashAndCashEquivalents": 16286000000i64,
                "goodwill": 17997000000i64, "accountsPayable": 479000000i64,
                "longTermDebt": 20463000000i64, "totalStockholdersEquity": 38733000000i64
            }]),
        );
    }
    write_json(
        dir,
        "cash-flow-statement",
        json!([{
            "date": "2023-09-30", "period": "FY", "netIncome": 17273000000i64,
            "capitalExpenditure": -1059000000i64, "dividendsPaid": -3751000000i64,
            "someNewMetric": 12
        }]),
    );
}

#[test]
fn test_report_written_from_saved_responses() {
    let dir = scratch_dir("ok");
    write_fixtures(&dir, true);
    let output = dir.join("V_Financials_Styled.xlsx");

    let source = JsonDirSource::new(&dir);
    let config = ReportConfig::new("V").with_output(output.clone());
    let report = generate_report(&source, &config, &RuleBook::builtin()).unwrap();

    assert_eq!(report.output, output);
    assert!(fs::read(&output).unwrap().starts_with(b"PK"));
    assert!(!dir.join(".V_Financials_Styled.xlsx.tmp").exists());

    let names: Vec<&str> = report.sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Income Statement", "Balance Sheet", "Cash Flow"]);

    let income = &report.sheets[0];
    assert_eq!(income.periods, vec!["2022", "2023"]);
    assert_eq!(
        income.sections,
        vec![
            "Revenue",
            "Cost Of Revenue",
            "Gross Profit",
            "Operating Expenses",
            "Operating Income",
            "Other Income / Expense",
            "Pre-Tax Income",
            "Taxes",
            "Net Income",
            "Other Income Statement Items",
        ]
    );

    let cash_flow = &report.sheets[2];
    assert_eq!(cash_flow.sections.first().map(String::as_str), Some("Cash Flow From Operations"));
    assert_eq!(cash_flow.sections.last().map(String::as_str), Some("Other Cash Flow Items"));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_missing_statement_aborts_without_output() {
    let dir = scratch_dir("missing");
    write_fixtures(&dir, false);
    let output = dir.join("out.xlsx");

    let source = JsonDirSource::new(&dir);
    let config = ReportConfig::new("V").with_output(output.clone());
    let err = generate_report(&source, &config, &RuleBook::builtin()).unwrap_err();

    match err {
        ReportError::Statement { statement, .. } => assert_eq!(statement, "Balance Sheet"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
    assert!(!dir.join(".out.xlsx.tmp").exists());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_custom_rules_file_changes_sections() {
    let dir = scratch_dir("rules");
    write_fixtures(&dir, true);
    let rules_path = dir.join("rules.json");
    fs::write(
        &rules_path,
        json!({
            "cash_flow": {
                "other_label": "Everything Else",
                "rules": [{ "section": "Capital Spending", "keywords": ["capital expenditure"] }]
            }
        })
        .to_string(),
    )
    .unwrap();

    let source = JsonDirSource::new(&dir);
    let config = ReportConfig::new("V").with_output(dir.join("custom.xlsx"));
    let rules = RuleBook::from_file(&rules_path).unwrap();
    let report = generate_report(&source, &config, &rules).unwrap();

    assert_eq!(report.sheets[2].sections, vec!["Capital Spending", "Everything Else"]);
    // Statements the file leaves out keep the built-in rules
    assert_eq!(report.sheets[0].sections.first().map(String::as_str), Some("Revenue"));

    let _ = fs::remove_dir_all(dir);
}
