// ⚠️ Report Errors - every failure aborts the run
// One enum for the whole pipeline: fetch, reshape, rules, workbook output

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// Provider refused access (HTTP 403). Usually a plan restriction or a bad key.
    #[error("403 Forbidden from provider for '{endpoint}': plan restriction or invalid/blocked API key ({body})")]
    AccessDenied { endpoint: String, body: String },

    #[error("provider returned HTTP {status} for '{endpoint}'")]
    HttpStatus { endpoint: String, status: u16 },

    #[error("request to '{endpoint}' failed")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response was not a list of records (error object, scalar, ...)
    #[error("unexpected payload from '{endpoint}': {detail}")]
    MalformedPayload { endpoint: String, detail: String },

    #[error("expected '{column}' column in response, got: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("could not parse date '{value}' in '{column}'")]
    InvalidDate { column: String, value: String },

    /// Table data does not fit the period columns
    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error("invalid rules: {0}")]
    Rules(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{statement} failed")]
    Statement {
        statement: String,
        #[source]
        source: Box<ReportError>,
    },

    #[error("I/O error on {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build workbook")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

impl ReportError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }

    /// Tag an error with the statement whose pipeline produced it
    pub fn in_statement(self, statement: &str) -> Self {
        ReportError::Statement {
            statement: statement.to_string(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_wrapping_keeps_cause() {
        let err = ReportError::MissingColumn {
            column: "date".to_string(),
            available: vec!["symbol".to_string()],
        }
        .in_statement("Balance Sheet");

        assert_eq!(err.to_string(), "Balance Sheet failed");
        let cause = std::error::Error::source(&err).map(|e| e.to_string());
        assert_eq!(
            cause,
            Some("expected 'date' column in response, got: [\"symbol\"]".to_string())
        );
    }

    #[test]
    fn test_access_denied_message_is_descriptive() {
        let err = ReportError::AccessDenied {
            endpoint: "income-statement".to_string(),
            body: "Invalid API KEY".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("income-statement"));
        assert!(msg.contains("Invalid API KEY"));
    }
}
