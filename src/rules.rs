// 🏷️ Classification Rules - Rules as Data
// Ordered (section, keywords) lists, one per statement. First match wins.

use crate::error::{ReportError, Result};
use crate::normalize::normalize;
use crate::statement::StatementKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Section rows are assigned to (also the banner text)
    pub section: String,

    /// Substrings looked up in the normalized label, in declared order
    pub keywords: Vec<String>,

    /// Substrings that veto this rule even when a keyword matches
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl ClassificationRule {
    pub fn new(section: &str, keywords: &[&str]) -> Self {
        ClassificationRule {
            section: section.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            exclude: Vec::new(),
        }
    }

    /// Builder pattern: add veto substrings
    pub fn excluding(mut self, exclude: &[&str]) -> Self {
        self.exclude = exclude.iter().map(|k| k.to_string()).collect();
        self
    }

    /// First keyword contained in an already-normalized label
    pub fn matching_keyword(&self, normalized_label: &str) -> Option<&str> {
        if self
            .exclude
            .iter()
            .any(|ex| !ex.is_empty() && normalized_label.contains(ex.as_str()))
        {
            return None;
        }

        self.keywords
            .iter()
            .map(String::as_str)
            .find(|kw| !kw.is_empty() && normalized_label.contains(kw))
    }

    /// Check if any keyword matches the given display label
    pub fn matches(&self, label: &str) -> bool {
        self.matching_keyword(&normalize(label)).is_some()
    }
}

// ============================================================================
// MATCH RESULT
// ============================================================================

/// Which rule claimed a label, and through which keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    pub rule_index: usize,
    pub section: &'a str,
    pub keyword: &'a str,
}

// ============================================================================
// RULE SET
// ============================================================================

/// Priority-ordered rules for one statement plus its catch-all label.
///
/// Order is the only precedence: the first rule with any matching keyword
/// wins. Nothing here ever sorts or dedups rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<ClassificationRule>,
    other_label: String,
}

impl RuleSet {
    pub fn new(rules: Vec<ClassificationRule>, other_label: &str) -> Self {
        RuleSet {
            rules,
            other_label: other_label.to_string(),
        }
    }

    /// Build from user-supplied rules: keywords normalized, empties dropped,
    /// section names checked.
    pub fn from_rules(rules: Vec<ClassificationRule>, other_label: &str) -> Result<Self> {
        if rules.is_empty() {
            return Err(ReportError::Rules("rule set has no rules".to_string()));
        }

        let mut seen = HashSet::new();
        let mut cleaned = Vec::with_capacity(rules.len());
        for rule in rules {
            let section = rule.section.trim().to_string();
            if section.is_empty() {
                return Err(ReportError::Rules("rule with empty section name".to_string()));
            }
            if section == other_label {
                return Err(ReportError::Rules(format!(
                    "section '{}' collides with the catch-all label",
                    section
                )));
            }
            if !seen.insert(section.clone()) {
                return Err(ReportError::Rules(format!("duplicate section '{}'", section)));
            }

            cleaned.push(ClassificationRule {
                section,
                keywords: normalize_all(&rule.keywords),
                exclude: normalize_all(&rule.exclude),
            });
        }

        Ok(RuleSet::new(cleaned, other_label))
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn other_label(&self) -> &str {
        &self.other_label
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.section.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply rules to one display label. `None` means the catch-all.
    pub fn match_label(&self, label: &str) -> Option<RuleMatch<'_>> {
        self.match_normalized(&normalize(label))
    }

    pub fn match_normalized(&self, normalized_label: &str) -> Option<RuleMatch<'_>> {
        self.rules.iter().enumerate().find_map(|(rule_index, rule)| {
            rule.matching_keyword(normalized_label).map(|keyword| RuleMatch {
                rule_index,
                section: rule.section.as_str(),
                keyword,
            })
        })
    }

    // ========================================================================
    // BUILT-IN RULE SETS
    // ========================================================================

    pub fn builtin(kind: StatementKind) -> Self {
        match kind {
            StatementKind::Income => RuleSet::income(),
            StatementKind::BalanceSheet => RuleSet::balance_sheet(),
            StatementKind::CashFlow => RuleSet::cash_flow(),
        }
    }

    pub fn default_other_label(kind: StatementKind) -> &'static str {
        match kind {
            StatementKind::Income => "Other Income Statement Items",
            StatementKind::BalanceSheet => "Other Balance Sheet Items",
            StatementKind::CashFlow => "Other Cash Flow Items",
        }
    }

    pub fn income() -> Self {
        RuleSet::new(
            vec![
                ClassificationRule::new("Revenue", &["revenue", "sales"])
                    .excluding(&["cost of"]),
                ClassificationRule::new("Cost Of Revenue", &["cost of revenue", "cost of goods", "cogs"]),
                ClassificationRule::new("Gross Profit", &["gross profit"]),
                ClassificationRule::new(
                    "Operating Expenses",
                    &[
                        "selling",
                        "general",
                        "administrative",
                        "sg a",
                        "marketing",
                        "research",
                        "development",
                        "operating expense",
                    ],
                ),
                ClassificationRule::new("Operating Income", &["operating income", "ebit"]),
                ClassificationRule::new(
                    "Other Income / Expense",
                    &["interest", "other income", "other expense", "non operating"],
                ),
                ClassificationRule::new("Pre-Tax Income", &["income before tax", "pretax"]),
                ClassificationRule::new("Taxes", &["tax", "income tax"]),
                ClassificationRule::new("Net Income", &["net income", "net earnings"]),
            ],
            RuleSet::default_other_label(StatementKind::Income),
        )
    }

    pub fn balance_sheet() -> Self {
        RuleSet::new(
            vec![
                ClassificationRule::new(
                    "Current Assets",
                    &[
                        "cash",
                        "receivable",
                        "inventory",
                        "prepaid",
                        "short term",
                        "current asset",
                        "marketable securities",
                    ],
                ),
                ClassificationRule::new(
                    "Non-Current Assets",
                    &[
                        "property",
                        "plant",
                        "equipment",
                        "pp e",
                        "goodwill",
                        "intangible",
                        "long term",
                        "non current asset",
                        "deferred tax asset",
                        "right of use",
                        "lease asset",
                        "investment",
                    ],
                ),
                ClassificationRule::new(
                    "Current Liabilities",
                    &[
                        "accounts payable",
                        "payable",
                        "accrued",
                        "current liability",
                        "short term debt",
                        "deferred revenue",
                        "tax payable",
                        "current portion",
                    ],
                ),
                ClassificationRule::new(
                    "Non-Current Liabilities",
                    &[
                        "long term debt",
                        "non current liability",
                        "deferred tax liability",
                        "lease liability",
                        "pension",
                    ],
                ),
                ClassificationRule::new(
                    "Equity",
                    &[
                        "equity",
                        "stockholders",
                        "retained earnings",
                        "common stock",
                        "additional paid",
                        "aoci",
                        "treasury",
                    ],
                ),
            ],
            RuleSet::default_other_label(StatementKind::BalanceSheet),
        )
    }

    pub fn cash_flow() -> Self {
        RuleSet::new(
            vec![
                ClassificationRule::new(
                    "Cash Flow From Operations",
                    &[
                        "net income",
                        "depreciation",
                        "amortization",
                        "stock based",
                        "working capital",
                        "accounts receivable",
                        "inventory",
                        "accounts payable",
                        "deferred tax",
                        "operating activities",
                    ],
                ),
                ClassificationRule::new(
                    "Cash Flow From Investing",
                    &[
                        "capital expenditure",
                        "capex",
                        "property plant",
                        "acquisition",
                        "investment",
                        "investing activities",
                        "purchase of investments",
                        "sale of investments",
                    ],
                ),
                ClassificationRule::new(
                    "Cash Flow From Financing",
                    &[
                        "debt",
                        "repurchase",
                        "dividend",
                        "issuance",
                        "financing activities",
                        "borrow",
                        "repay",
                        "common stock",
                        "treasury stock",
                    ],
                ),
            ],
            RuleSet::default_other_label(StatementKind::CashFlow),
        )
    }
}

// ============================================================================
// RULE BOOK (one rule set per statement)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBook {
    pub income: RuleSet,
    pub balance_sheet: RuleSet,
    pub cash_flow: RuleSet,
}

#[derive(Debug, Deserialize)]
struct RuleSetFile {
    other_label: Option<String>,
    rules: Vec<ClassificationRule>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleBookFile {
    income: Option<RuleSetFile>,
    balance_sheet: Option<RuleSetFile>,
    cash_flow: Option<RuleSetFile>,
}

impl RuleBook {
    pub fn builtin() -> Self {
        RuleBook {
            income: RuleSet::income(),
            balance_sheet: RuleSet::balance_sheet(),
            cash_flow: RuleSet::cash_flow(),
        }
    }

    pub fn get(&self, kind: StatementKind) -> &RuleSet {
        match kind {
            StatementKind::Income => &self.income,
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::CashFlow => &self.cash_flow,
        }
    }

    /// Load rules from JSON file. Statements the file leaves out keep the built-ins.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ReportError::io(path.display().to_string(), e))?;
        RuleBook::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: RuleBookFile = serde_json::from_str(content)
            .map_err(|e| ReportError::Rules(format!("failed to parse rules JSON: {}", e)))?;

        Ok(RuleBook {
            income: resolve(file.income, StatementKind::Income)?,
            balance_sheet: resolve(file.balance_sheet, StatementKind::BalanceSheet)?,
            cash_flow: resolve(file.cash_flow, StatementKind::CashFlow)?,
        })
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_all(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| normalize(w))
        .filter(|w| !w.is_empty())
        .collect()
}

fn resolve(file: Option<RuleSetFile>, kind: StatementKind) -> Result<RuleSet> {
    match file {
        None => Ok(RuleSet::builtin(kind)),
        Some(set) => {
            let other_label = set
                .other_label
                .unwrap_or_else(|| RuleSet::default_other_label(kind).to_string());
            RuleSet::from_rules(set.rules, &other_label).map_err(|e| match e {
                ReportError::Rules(msg) => ReportError::Rules(format!("{}: {}", kind, msg)),
                other => other,
            })
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
