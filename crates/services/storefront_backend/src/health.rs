// --- File: crates/services/storefront_backend/src/health.rs ---
use crate::app_state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use storefront_common::{handle_envelope_result, Envelope, StorefrontError};
use storefront_stripe::error::MISSING_DATABASE;
use tracing::error;

/// Liveness: always `{"ok": true}`.
pub async fn health_handler() -> Response {
    Envelope::new(json!({})).into_response()
}

/// Readiness of the database: pings the server without writing anything.
pub async fn health_db_handler(State(state): State<AppState>) -> Response {
    let result: Result<Value, StorefrontError> = match &state.db {
        None => Err(StorefrontError::ConfigError(MISSING_DATABASE.to_string())),
        Some(db) => db.ping().await.map(|_| json!({})).map_err(StorefrontError::from),
    };
    if let Err(err) = &result {
        error!(error = %err, "Database health check failed");
    }
    handle_envelope_result(result)
}
