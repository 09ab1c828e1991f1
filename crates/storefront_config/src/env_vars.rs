//! Environment variable handling for the storefront backend.
//!
//! Non-secret settings can be overridden with prefixed variables
//! (`STOREFRONT__SERVER__PORT=9000`). Secrets use the plain, well-known names
//! that the hosting platform already provides.

use crate::models::AppConfig;
use std::env;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "STOREFRONT";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

pub const STRIPE_SECRET_KEY: &str = "STRIPE_SECRET_KEY";
pub const STRIPE_WEBHOOK_SECRET: &str = "STRIPE_WEBHOOK_SECRET";
pub const STRIPE_SUBSCRIPTION_PRICE_ID: &str = "STRIPE_SUBSCRIPTION_PRICE_ID";
pub const MONGODB_URI: &str = "MONGODB_URI";
pub const MONGODB_DB: &str = "MONGODB_DB";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// `"server.port"` becomes `"STOREFRONT__SERVER__PORT"`.
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Fills the secret fields of `config` from `lookup`.
///
/// Empty values count as absent. A value already present in the config
/// (e.g. from a local `config/debug.toml`) is replaced only when the
/// variable is set.
pub fn apply_secrets<F>(mut config: AppConfig, lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(v) = get(STRIPE_SECRET_KEY) {
        config.stripe.secret_key = Some(v);
    }
    if let Some(v) = get(STRIPE_WEBHOOK_SECRET) {
        config.stripe.webhook_secret = Some(v);
    }
    if let Some(v) = get(STRIPE_SUBSCRIPTION_PRICE_ID) {
        config.stripe.subscription_price_id = Some(v);
    }
    if let Some(v) = get(MONGODB_URI) {
        config.database.uri = Some(v);
    }
    if let Some(v) = get(MONGODB_DB) {
        config.database.name = Some(v);
    }
    config
}

/// [`apply_secrets`] against the process environment.
pub fn apply_env_secrets(config: AppConfig) -> AppConfig {
    apply_secrets(config, |name| env::var(name).ok())
}
