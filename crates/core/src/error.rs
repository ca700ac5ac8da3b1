//! Unified error types for the analytics service.
//!
//! Error codes:
//! - VALID_001-003: Request validation errors
//! - STORE_001-002: Key-value store errors

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// VALID_001: Body is not valid JSON / not a JSON object
    InvalidJson,
    /// VALID_002: Event is missing or has an invalid field
    InvalidEvent,
    /// VALID_003: Body exceeds the size limit
    PayloadTooLarge,
}

impl ValidationErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson => "VALID_001",
            Self::InvalidEvent => "VALID_002",
            Self::PayloadTooLarge => "VALID_003",
        }
    }
}

/// Store error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// STORE_001: Store could not be reached (network, timeout)
    Unavailable,
    /// STORE_002: Store answered with an error
    Rejected,
}

impl StoreErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable => "STORE_001",
            Self::Rejected => "STORE_002",
        }
    }
}

/// Unified error type for the analytics service.
#[derive(Debug, Error)]
pub enum Error {
    /// Validation error with code.
    #[error("{message}")]
    ValidationWithCode {
        code: &'static str,
        message: String,
    },

    /// Store error with code.
    #[error("{message}")]
    Store { code: &'static str, message: String },

    #[error("malformed record: {0}")]
    Schema(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error with code.
    pub fn validation_code(code: ValidationErrorCode, msg: impl Into<String>) -> Self {
        Self::ValidationWithCode {
            code: code.code(),
            message: msg.into(),
        }
    }

    /// Create a store error.
    pub fn store(code: StoreErrorCode, msg: impl Into<String>) -> Self {
        Self::Store {
            code: code.code(),
            message: msg.into(),
        }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::ValidationWithCode { code, .. } => Some(code),
            Self::Store { code, .. } => Some(code),
            Self::MissingField(_) => {
                Some(ValidationErrorCode::InvalidEvent.code())
            }
            _ => None,
        }
    }

    /// Whether the error originated in the key-value store.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store { .. })
    }
}
