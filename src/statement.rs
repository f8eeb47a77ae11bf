// 📑 Statement Types
// The three statements a report is made of, with their provider endpoints and sheet names

use crate::rules::RuleSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Income,
    BalanceSheet,
    CashFlow,
}

impl StatementKind {
    /// Report order: income, balance sheet, cash flow
    pub fn all() -> [StatementKind; 3] {
        [
            StatementKind::Income,
            StatementKind::BalanceSheet,
            StatementKind::CashFlow,
        ]
    }

    /// Provider endpoint path segment
    pub fn endpoint(&self) -> &'static str {
        match self {
            StatementKind::Income => "income-statement",
            StatementKind::BalanceSheet => "balance-sheet-statement",
            StatementKind::CashFlow => "cash-flow-statement",
        }
    }

    /// Worksheet name in the output workbook
    pub fn sheet_name(&self) -> &'static str {
        match self {
            StatementKind::Income => "Income Statement",
            StatementKind::BalanceSheet => "Balance Sheet",
            StatementKind::CashFlow => "Cash Flow",
        }
    }

    /// Title shown in row 1, after the ticker
    pub fn title_suffix(&self) -> &'static str {
        match self {
            StatementKind::Income => "Income Statement",
            StatementKind::BalanceSheet => "Balance Sheet",
            StatementKind::CashFlow => "Cash Flow Statement",
        }
    }

    pub fn title(&self, ticker: &str) -> String {
        format!("{} — {}", ticker, self.title_suffix())
    }

    /// Built-in classification rules for this statement
    pub fn rules(&self) -> RuleSet {
        RuleSet::builtin(*self)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

impl FromStr for StatementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "income" | "income_statement" | "is" => Ok(StatementKind::Income),
            "balance" | "balance_sheet" | "balance_sheet_statement" | "bs" => {
                Ok(StatementKind::BalanceSheet)
            }
            "cash" | "cash_flow" | "cash_flow_statement" | "cf" => Ok(StatementKind::CashFlow),
            other => Err(format!(
                "unknown statement '{}' (expected income, balance-sheet or cash-flow)",
                other
            )),
        }
    }
}
