use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::FieldErrors;

/// Message shown when a failure carries no message of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

#[derive(Error, Debug)]
pub enum DocketError {
    #[error("ticket '{0}' not found")]
    TicketNotFound(String),

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The remote collaborator answered with an error body.
    #[error("{message}")]
    Service {
        status: u16,
        message: String,
        code: String,
    },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("invalid priority '{0}'")]
    InvalidPriority(String),

    #[error("invalid sort '{0}' (expected createdAt|updatedAt followed by _asc|_desc)")]
    InvalidSort(String),

    #[error("invalid route '{0}'")]
    InvalidRoute(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification used by views to pick an error affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Entity has no match; shown as a not-found state.
    NotFound,
    /// Local input failed constraints; shown inline, never sent.
    Validation,
    /// Server-side or network failure; shown with a retry affordance.
    Transient,
    /// Anything else (bad arguments, configuration).
    Usage,
}

impl DocketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocketError::TicketNotFound(_) => ErrorKind::NotFound,
            DocketError::Validation(_) => ErrorKind::Validation,
            DocketError::Service { .. } | DocketError::Network(_) => ErrorKind::Transient,
            _ => ErrorKind::Usage,
        }
    }

    /// Whether a manual retry could succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// Human-readable message for a notification or error state.
    pub fn user_message(&self) -> String {
        match self {
            DocketError::Service { message, .. } if message.trim().is_empty() => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
            DocketError::Service { message, .. } => message.clone(),
            DocketError::TicketNotFound(_) => "Not found".to_string(),
            other => other.to_string(),
        }
    }
}

/// Error body shared by every failing response of the collaborator.
///
/// Both fields are optional on the way in; a missing `message` is replaced by
/// an operation-specific fallback on the client side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorBody {
    pub const NOT_FOUND: &'static str = "E_NOT_FOUND";
    pub const BAD_REQUEST: &'static str = "E_BAD_REQUEST";
    pub const METHOD_NOT_ALLOWED: &'static str = "E_METHOD_NOT_ALLOWED";
    pub const RANDOM: &'static str = "E_RANDOM";

    pub fn new(message: impl Into<String>, code: &str) -> Self {
        Self {
            message: Some(message.into()),
            code: Some(code.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_message_is_surfaced() {
        let err = DocketError::Service {
            status: 500,
            message: "Something broke".to_string(),
            code: "E_RANDOM".to_string(),
        };
        assert_eq!(err.user_message(), "Something broke");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_blank_service_message_falls_back() {
        let err = DocketError::Service {
            status: 502,
            message: "  ".to_string(),
            code: String::new(),
        };
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            DocketError::TicketNotFound("t".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DocketError::Network("reset".into()).kind(),
            ErrorKind::Transient
        );
        assert_eq!(
            DocketError::InvalidSort("x".into()).kind(),
            ErrorKind::Usage
        );
        assert!(!DocketError::Validation(FieldErrors::default()).is_retryable());
    }

    #[test]
    fn test_error_body_tolerates_missing_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"code":"E_X"}"#).unwrap();
        assert_eq!(body.message, None);
        assert_eq!(body.code.as_deref(), Some("E_X"));
    }
}
