// 🌐 Statement Sources - where raw records come from
// Provider over HTTP, or a directory of saved JSON responses

use crate::config::{ProviderConfig, ReportConfig};
use crate::error::{ReportError, Result};
use crate::statement::StatementKind;
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

/// One provider record: field name -> value, in provider order
pub type RawRecord = Map<String, Value>;

// ============================================================================
// CORE TRAIT
// ============================================================================

pub trait StatementSource {
    /// Raw annual records for one statement, or a fatal error
    fn fetch(&self, kind: StatementKind) -> Result<Vec<RawRecord>>;

    /// Short description for logs
    fn name(&self) -> &str;
}

/// Accept only a list of JSON objects.
pub fn validate_payload(endpoint: &str, payload: Value) -> Result<Vec<RawRecord>> {
    let malformed = |detail: String| ReportError::MalformedPayload {
        endpoint: endpoint.to_string(),
        detail,
    };

    match payload {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(malformed(format!(
                    "record {} is {}, not an object",
                    i,
                    json_kind(&other)
                ))),
            })
            .collect(),
        Value::Object(map) => Err(malformed(format!(
            "provider error payload: {}",
            Value::Object(map)
        ))),
        other => Err(malformed(format!(
            "expected a list of records, got {}: {}",
            json_kind(&other),
            other
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_body(endpoint: &str, body: &str) -> Result<Vec<RawRecord>> {
    let payload: Value = serde_json::from_str(body).map_err(|e| ReportError::MalformedPayload {
        endpoint: endpoint.to_string(),
        detail: format!("response is not JSON: {}", e),
    })?;
    validate_payload(endpoint, payload)
}

// ============================================================================
// PROVIDER CLIENT
// ============================================================================

/// Financial Modeling Prep client (blocking, fixed per-request timeout, no retries)
pub struct FmpClient {
    http: Client,
    base_url: String,
    api_key: String,
    ticker: String,
    years: usize,
}

impl FmpClient {
    pub fn new(provider: &ProviderConfig, report: &ReportConfig) -> Result<Self> {
        provider.validate()?;

        let http = Client::builder()
            .timeout(provider.timeout)
            .build()
            .map_err(|source| ReportError::Transport {
                endpoint: provider.base_url.clone(),
                source,
            })?;

        Ok(FmpClient {
            http,
            base_url: provider.base_url.trim_end_matches('/').to_string(),
            api_key: provider.api_key.clone(),
            ticker: report.ticker.clone(),
            years: report.years,
        })
    }
}

impl StatementSource for FmpClient {
    fn fetch(&self, kind: StatementKind) -> Result<Vec<RawRecord>> {
        let endpoint = kind.endpoint();
        let url = format!("{}/{}", self.base_url, endpoint);
        let limit = self.years.to_string();
        info!("Fetching {} for {} ({} years)", endpoint, self.ticker, self.years);

        // The request URL carries the API key; keep it out of error output
        let transport = |source: reqwest::Error| ReportError::Transport {
            endpoint: endpoint.to_string(),
            source: source.without_url(),
        };

        let response = self
            .http
            .get(&url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("symbol", self.ticker.as_str()),
                ("period", "annual"),
                ("limit", limit.as_str()),
            ])
            .send()
            .map_err(transport)?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            let body = response.text().unwrap_or_default();
            return Err(ReportError::AccessDenied {
                endpoint: endpoint.to_string(),
                body,
            });
        }
        if !status.is_success() {
            return Err(ReportError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(transport)?;
        let records = parse_body(endpoint, &body)?;
        debug!("{} returned {} records", endpoint, records.len());
        Ok(records)
    }

    fn name(&self) -> &str {
        "financialmodelingprep"
    }
}

// ============================================================================
// OFFLINE SOURCE
// ============================================================================

/// Reads `<dir>/<endpoint>.json`, e.g. `income-statement.json`
pub struct JsonDirSource {
    dir: PathBuf,
    label: String,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let label = format!("json dir {}", dir.display());
        JsonDirSource { dir, label }
    }

    pub fn path_for(&self, kind: StatementKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.endpoint()))
    }
}

impl StatementSource for JsonDirSource {
    fn fetch(&self, kind: StatementKind) -> Result<Vec<RawRecord>> {
        let path = self.path_for(kind);
        debug!("Reading {}", path.display());

        let body = fs::read_to_string(&path)
            .map_err(|e| ReportError::io(path.display().to_string(), e))?;
        parse_body(kind.endpoint(), &body)
    }

    fn name(&self) -> &str {
        &self.label
    }
}
