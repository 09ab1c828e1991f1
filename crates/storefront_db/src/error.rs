//! Error types for the database client

use storefront_common::StorefrontError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from the MongoDB driver
    #[error("MongoDB error: {0}")]
    MongoError(#[from] mongodb::error::Error),

    /// Missing or invalid database configuration
    #[error("{0}")]
    ConfigError(String),

    /// A record could not be turned into a BSON document
    #[error("Failed to encode document: {0}")]
    EncodeError(#[from] mongodb::bson::ser::Error),

    /// A stored document does not match the expected shape
    #[error("Failed to decode document: {0}")]
    DecodeError(#[from] mongodb::bson::de::Error),
}

impl From<DbError> for StorefrontError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConfigError(msg) => StorefrontError::ConfigError(msg),
            other => StorefrontError::DatabaseError(other.to_string()),
        }
    }
}
