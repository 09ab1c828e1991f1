// --- File: crates/storefront_common/src/lib.rs ---

// Declare modules within this crate
pub mod error;    // Error handling
pub mod http;     // HTTP utilities
pub mod logging;  // Logging utilities
pub mod models;   // Shared data structures
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    config_error, external_service_error, validation_error, HttpStatusCode, StorefrontError,
};

// Re-export HTTP utilities for easier access
pub use http::{
    client::{create_client, default_client},
    handle_envelope_result, Envelope, IntoHttpResponse,
};

pub use services::BoxFuture;
