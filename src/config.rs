// ⚙️ Report Configuration
// Passed explicitly through the pipeline. Nothing here is global.

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TICKER: &str = "V";
pub const DEFAULT_YEARS: usize = 5;
pub const DEFAULT_SCALE: u64 = 1_000;
pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/stable";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Appears in sheet titles only; classification ignores it
    pub ticker: String,

    /// Annual periods to pull (bounds the column count)
    pub years: usize,

    /// Divisor applied to every figure: 1, 1_000 ($000s), 1_000_000 ($MM)
    pub scale: u64,

    /// Output workbook path
    pub output: PathBuf,
}

impl ReportConfig {
    pub fn new(ticker: &str) -> Self {
        ReportConfig {
            ticker: ticker.to_string(),
            years: DEFAULT_YEARS,
            scale: DEFAULT_SCALE,
            output: default_output(ticker),
        }
    }

    pub fn with_years(mut self, years: usize) -> Self {
        self.years = years;
        self
    }

    pub fn with_scale(mut self, scale: u64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_output(mut self, output: PathBuf) -> Self {
        self.output = output;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.ticker.trim().is_empty() {
            return Err(ReportError::Config("ticker must not be empty".to_string()));
        }
        if self.years == 0 {
            return Err(ReportError::Config("years must be at least 1".to_string()));
        }
        if self.scale == 0 {
            return Err(ReportError::Config("scale must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Annotation shown top-right on every sheet
    pub fn units_label(&self) -> String {
        units_label(self.scale)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig::new(DEFAULT_TICKER)
    }
}

pub fn default_output(ticker: &str) -> PathBuf {
    PathBuf::from(format!("{}_Financials_Styled.xlsx", ticker))
}

pub fn units_label(scale: u64) -> String {
    let unit = match scale {
        1 => "$",
        1_000 => "$000s",
        1_000_000 => "$MM",
        _ => "scaled",
    };
    format!("USD ({})", unit)
}

// ============================================================================
// PROVIDER
// ============================================================================

/// Where and how to reach the data provider
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(api_key: &str) -> Self {
        ProviderConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ReportError::Config(
                "an API key is required (set FMP_API_KEY or pass --api-key)".to_string(),
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ReportError::Config(format!("base URL '{}' is not http(s)", self.base_url)));
        }
        Ok(())
    }
}

// Keep the key out of logs and error output
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
