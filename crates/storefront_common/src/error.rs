// --- File: crates/storefront_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all storefront errors.
///
/// Each crate converts its own error type into this one with
/// `From<SpecificError> for StorefrontError`; the HTTP layer only ever
/// renders `StorefrontError`.
#[derive(Error, Debug)]
pub enum StorefrontError {
    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// A required setting or secret is absent
    #[error("{0}")]
    ConfigError(String),

    /// Webhook signature could not be verified
    #[error("{0}")]
    SignatureError(String),

    /// Malformed client input
    #[error("{0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Provider failure whose message is shown as reported
    #[error("{0}")]
    UpstreamError(String),

    /// Error occurred during external service call
    #[error("{service_name} error: {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for StorefrontError {
    fn status_code(&self) -> u16 {
        match self {
            StorefrontError::ParseError(_) => 500,
            StorefrontError::ConfigError(_) => 500,
            StorefrontError::SignatureError(_) => 400,
            StorefrontError::ValidationError(_) => 400,
            StorefrontError::DatabaseError(_) => 500,
            // Provider status codes are never passed through.
            StorefrontError::UpstreamError(_) => 500,
            StorefrontError::ExternalServiceError { .. } => 500,
            StorefrontError::InternalError(_) => 500,
        }
    }
}

impl StorefrontError {
    /// True for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

// Common error conversions
impl From<serde_json::Error> for StorefrontError {
    fn from(err: serde_json::Error) -> Self {
        StorefrontError::ParseError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> StorefrontError {
    StorefrontError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> StorefrontError {
    StorefrontError::ValidationError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> StorefrontError {
    StorefrontError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
