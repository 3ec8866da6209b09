use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Unique error codes for client identification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database errors (1xxx)
    DatabaseConnection = 1001,
    DatabaseQuery = 1002,

    // Validation errors (2xxx)
    ValidationFailed = 2001,
    MissingField = 2002,
    InvalidUrl = 2003,

    // Resource errors (3xxx)
    NotFound = 3001,
    AlreadyExists = 3002,

    // Provider errors (4xxx)
    ProviderError = 4001,
    ProviderTimeout = 4002,

    // Extraction errors (5xxx)
    ContentTooShort = 5001,
    ExtractionExhausted = 5002,

    // Internal errors (9xxx)
    InternalError = 9001,
    ConfigurationError = 9002,
}

impl ErrorCode {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

/// Application error types covering the whole pipeline
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Resource errors
    #[error("Resource not found: {resource_type} with id {resource_id}")]
    NotFound {
        resource_type: String,
        resource_id: String,
    },

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    // Missing credentials surface only on calls that need the provider
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // Transport/HTTP failure from a third party, with status when known
    #[error("{provider} error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Provider {
        provider: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("{stage} timed out after {secs} seconds")]
    Timeout { stage: &'static str, secs: u64 },

    // Extraction errors
    #[error("Extracted content too short: {length} chars, minimum {minimum}")]
    ContentTooShort { length: usize, minimum: usize },

    #[error("All {attempts} extraction strategies failed for {url}: {last_error}")]
    ExtractionExhausted {
        url: String,
        attempts: usize,
        last_error: String,
    },

    // Database errors
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] sea_orm::DbErr),

    #[error("Database connection error: {0}")]
    DatabaseConnectionError(String),

    // Internal errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ValidationError(_) => ErrorCode::ValidationFailed,
            Self::MissingField(_) => ErrorCode::MissingField,
            Self::InvalidUrl(_) => ErrorCode::InvalidUrl,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::AlreadyExists(_) => ErrorCode::AlreadyExists,
            Self::ConfigurationError(_) => ErrorCode::ConfigurationError,
            Self::Provider { .. } => ErrorCode::ProviderError,
            Self::Timeout { .. } => ErrorCode::ProviderTimeout,
            Self::ContentTooShort { .. } => ErrorCode::ContentTooShort,
            Self::ExtractionExhausted { .. } => ErrorCode::ExtractionExhausted,
            Self::DatabaseQueryError(_) => ErrorCode::DatabaseQuery,
            Self::DatabaseConnectionError(_) => ErrorCode::DatabaseConnection,
            Self::Io(_) => ErrorCode::InternalError,
            Self::InternalError(_) => ErrorCode::InternalError,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Provider { .. } => StatusCode::BAD_GATEWAY,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::ContentTooShort { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ExtractionExhausted { .. } => StatusCode::BAD_GATEWAY,
            Self::DatabaseQueryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::DatabaseConnectionError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether a retry against the provider could succeed.
    /// 429 is retryable; 401 (bad credentials) and everything else is not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Provider {
                status: Some(429),
                ..
            } | Self::Timeout { .. }
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        // Log based on severity
        match &self {
            AppError::ValidationError(_)
            | AppError::MissingField(_)
            | AppError::InvalidUrl(_)
            | AppError::NotFound { .. }
            | AppError::AlreadyExists(_) => {
                tracing::debug!(error_code = error_code.as_u16(), %message, "Client error");
            }
            AppError::Provider { .. }
            | AppError::Timeout { .. }
            | AppError::ContentTooShort { .. }
            | AppError::ExtractionExhausted { .. } => {
                tracing::warn!(error_code = error_code.as_u16(), %message, "Upstream error");
            }
            _ => {
                tracing::error!(error_code = error_code.as_u16(), %message, error = ?self, "Server error");
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code.as_u16(),
                "status": status.as_u16(),
                "message": message,
                "details": if cfg!(debug_assertions) {
                    Some(format!("{:?}", self))
                } else {
                    None
                }
            }
        }));

        (status, body).into_response()
    }
}
