use storefront_common::{config_error, external_service_error, validation_error, HttpStatusCode, StorefrontError};
use storefront_db::DbError;
use thiserror::Error;

/// Reported when no Stripe secret key is configured.
pub const MISSING_SECRET_KEY: &str = "Missing STRIPE_SECRET_KEY in env.";

/// Reported when no database connection is configured.
pub const MISSING_DATABASE: &str = "Database not configured. Set MONGODB_URI and MONGODB_DB.";

/// Stripe-specific error types.
#[derive(Error, Debug)]
pub enum StripeError {
    /// Error occurred during a Stripe API request
    #[error("Stripe API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Stripe API
    #[error("{message}")]
    ApiError { status_code: u16, message: String },

    /// Error parsing Stripe API response
    #[error("Failed to parse Stripe API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A required secret or setting is absent
    #[error("{0}")]
    ConfigError(String),

    /// Malformed checkout or lookup input
    #[error("{0}")]
    ValidationError(String),

    /// Webhook signature verification failed
    #[error("{0}")]
    WebhookSignatureError(String),

    /// Webhook event processing error
    #[error("Stripe webhook event processing error: {0}")]
    WebhookProcessingError(String),

    /// Order or subscriber persistence failed
    #[error(transparent)]
    Database(#[from] DbError),

    /// Internal processing error
    #[error("Internal processing error: {0}")]
    InternalError(String),
}

impl StripeError {
    pub fn config(message: impl Into<String>) -> Self {
        StripeError::ConfigError(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        StripeError::ValidationError(message.into())
    }
}

/// Convert StripeError to StorefrontError
impl From<StripeError> for StorefrontError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::RequestError(e) => StorefrontError::UpstreamError(e.to_string()),
            StripeError::ApiError { message, .. } => StorefrontError::UpstreamError(message),
            StripeError::ParseError(e) => e.into(),
            StripeError::ConfigError(msg) => config_error(msg),
            StripeError::ValidationError(msg) => validation_error(msg),
            StripeError::WebhookSignatureError(msg) => StorefrontError::SignatureError(msg),
            StripeError::WebhookProcessingError(msg) => external_service_error("Stripe webhook", msg),
            StripeError::Database(e) => e.into(),
            StripeError::InternalError(msg) => StorefrontError::InternalError(msg),
        }
    }
}

/// Status mapping: caller mistakes are 400, everything upstream or
/// configuration related is 500. Stripe's own status is never passed through.
impl HttpStatusCode for StripeError {
    fn status_code(&self) -> u16 {
        match self {
            StripeError::ValidationError(_) => 400,
            StripeError::WebhookSignatureError(_) => 400,
            StripeError::RequestError(_)
            | StripeError::ApiError { .. }
            | StripeError::ParseError(_)
            | StripeError::ConfigError(_)
            | StripeError::WebhookProcessingError(_)
            | StripeError::Database(_)
            | StripeError::InternalError(_) => 500,
        }
    }
}
