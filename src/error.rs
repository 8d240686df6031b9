//! Error types for loading shipment data and calling the insight service

use std::path::PathBuf;
use thiserror::Error;

/// The source file does not satisfy the expected schema
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("line {line}: invalid {column} '{value}': {reason}")]
    InvalidField {
        line: u64,
        column: String,
        value: String,
        reason: String,
    },

    #[error("line {line}: duplicate order id '{order_id}'")]
    DuplicateOrderId { line: u64, order_id: String },

    #[error("columns '{first}' and '{second}' name the same field")]
    DuplicateColumn { first: String, second: String },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to read data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl LoadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LoadError::Validation(_))
    }
}

/// Failure talking to the text-generation service. Never surfaced to a view:
/// the insight layer turns it into an unavailable narrative.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("insight service is not configured")]
    NotConfigured,

    #[error("insight request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("insight service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("insight service unreachable: {0}")]
    Transport(String),

    #[error("malformed insight response: {0}")]
    Malformed(String),
}

impl InsightError {
    /// Timeouts, connection failures and 408/429/5xx are worth one more try
    pub fn is_retryable(&self) -> bool {
        match self {
            InsightError::Timeout(_) | InsightError::Transport(_) => true,
            InsightError::Status { status, .. } => is_retryable_http_status(*status),
            InsightError::NotConfigured | InsightError::Malformed(_) => false,
        }
    }
}

pub fn is_retryable_http_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_policy_covers_transient_failures() {
        assert!(InsightError::Timeout(std::time::Duration::from_secs(1)).is_retryable());
        assert!(InsightError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(InsightError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!InsightError::Status { status: 401, body: String::new() }.is_retryable());
        assert!(!InsightError::Malformed("no choices".into()).is_retryable());
        assert!(!InsightError::NotConfigured.is_retryable());
    }

    #[test]
    fn load_error_kinds() {
        let missing = LoadError::NotFound(PathBuf::from("x.csv"));
        assert!(missing.is_not_found());
        let invalid = LoadError::from(ValidationError::MissingColumns(vec!["Quantity".into()]));
        assert!(invalid.is_validation());
        assert_eq!(
            invalid.to_string(),
            "validation failed: missing required column(s): Quantity"
        );
    }
}
