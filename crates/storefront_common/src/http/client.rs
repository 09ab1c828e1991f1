// --- File: crates/storefront_common/src/http/client.rs ---
use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Creates the HTTP client shared by all outbound calls of the process.
///
/// Build it once at startup and hand clones to the services that need it;
/// `reqwest::Client` is reference counted, clones share one connection pool.
pub fn create_client(timeout_secs: u64) -> Result<Client, ReqwestError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("storefront-backend/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// [`create_client`] with [`DEFAULT_TIMEOUT_SECS`].
pub fn default_client() -> Result<Client, ReqwestError> {
    create_client(DEFAULT_TIMEOUT_SECS)
}
