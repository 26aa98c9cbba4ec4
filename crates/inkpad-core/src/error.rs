//! Error types module
//!
//! All errors in the coordination layer are unified under the [`AppError`]
//! enum: template/network fetch failures, malformed completion payloads,
//! missing rows, transport errors, and internal faults. Each variant carries
//! a recoverability classification that callers use to decide between
//! retrying (the periodic tick reconciles most transient states) and
//! surfacing a visible failure.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Template fetch error: {0}")]
    TemplateFetch(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("No row for identity: {0}")]
    RowNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedPayload(format!("JSON parsing error: {}", err))
    }
}

impl AppError {
    /// Whether the failure is expected to clear on a later event or tick.
    ///
    /// Fetch and transport failures are transient (the periodic restart task
    /// and later transport events reconcile them); a missing row is a lost
    /// update that a later event repairs. A malformed payload or invalid
    /// setup input will not improve on retry.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::TemplateFetch(_) => true,
            AppError::Http(_) => true,
            AppError::MalformedPayload(_) => false,
            AppError::RowNotFound(_) => true,
            AppError::Transport(_) => true,
            AppError::InvalidInput(_) => false,
            AppError::Internal(_) => true,
            AppError::InternalWithSource { .. } => true,
        }
    }

    /// Duplicates the error so the same failure can be delivered to several
    /// consumers. `anyhow::Error` is not clonable, so a source chain is
    /// flattened into its message; every other variant is preserved exactly.
    pub fn share(&self) -> AppError {
        match self {
            AppError::TemplateFetch(msg) => AppError::TemplateFetch(msg.clone()),
            AppError::Http(msg) => AppError::Http(msg.clone()),
            AppError::MalformedPayload(msg) => AppError::MalformedPayload(msg.clone()),
            AppError::RowNotFound(msg) => AppError::RowNotFound(msg.clone()),
            AppError::Transport(msg) => AppError::Transport(msg.clone()),
            AppError::InvalidInput(msg) => AppError::InvalidInput(msg.clone()),
            AppError::Internal(msg) => AppError::Internal(msg.clone()),
            AppError::InternalWithSource { message, .. } => AppError::Internal(message.clone()),
        }
    }

    /// Get the error type name for structured log fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::TemplateFetch(_) => "TemplateFetch",
            AppError::Http(_) => "Http",
            AppError::MalformedPayload(_) => "MalformedPayload",
            AppError::RowNotFound(_) => "RowNotFound",
            AppError::Transport(_) => "Transport",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failure_is_recoverable() {
        let err = AppError::TemplateFetch("connection refused".to_string());
        assert!(err.is_recoverable());
        assert_eq!(err.error_type(), "TemplateFetch");
    }

    #[test]
    fn malformed_payload_is_not_recoverable() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::MalformedPayload(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn missing_row_is_recoverable() {
        let err = AppError::RowNotFound("abc123".to_string());
        assert!(err.is_recoverable());
    }

    #[test]
    fn share_preserves_variant_and_message() {
        let err = AppError::Http("bad gateway".to_string());
        let shared = err.share();
        assert!(matches!(&shared, AppError::Http(msg) if msg == "bad gateway"));
        assert_eq!(shared.error_type(), err.error_type());
    }

    #[test]
    fn share_flattens_a_source_chain() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert!(matches!(err.share(), AppError::Internal(msg) if msg == "boom"));
    }

    #[test]
    fn anyhow_conversion_keeps_source() {
        use std::error::Error;
        let err: AppError = anyhow::anyhow!("boom").into();
        assert!(err.source().is_some());
        assert_eq!(err.error_type(), "Internal");
    }
}
