// --- File: crates/storefront_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the static front-end, served as the fallback route when set.
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            static_dir: None,
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level for the storefront crates; `RUST_LOG` directives still apply on top.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// --- Database Config ---
// Connection string and database name are loaded from MONGODB_URI / MONGODB_DB.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub uri: Option<String>,
    pub name: Option<String>,
    pub max_pool_size: u32,
    pub server_selection_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: None,
            name: None,
            max_pool_size: 5,
            server_selection_timeout_ms: 8000,
        }
    }
}

// --- Stripe Config ---
// Secrets are loaded from STRIPE_SECRET_KEY, STRIPE_WEBHOOK_SECRET and
// STRIPE_SUBSCRIPTION_PRICE_ID. A missing secret only fails the handler that needs it.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct StripeConfig {
    pub api_base: String,
    pub api_version: String,
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub subscription_price_id: Option<String>,
    /// Maximum accepted age of a webhook signature timestamp, in seconds.
    pub webhook_tolerance_secs: i64,
    pub line_items_limit: u8,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.stripe.com".to_string(),
            api_version: "2024-06-20".to_string(),
            secret_key: None,
            webhook_secret: None,
            subscription_price_id: None,
            webhook_tolerance_secs: 300,
            line_items_limit: 100,
        }
    }
}

/// A fixed-amount shipping rate offered on one-time checkouts.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ShippingRateConfig {
    pub display_name: String,
    /// Amount in minor units.
    pub amount: i64,
    pub min_business_days: u32,
    pub max_business_days: u32,
}

// --- Store Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// Site identifier written into checkout metadata.
    pub site: String,
    /// Public origin that checkout redirects back to.
    pub base_url: String,
    pub currency: String,
    pub allowed_shipping_countries: Vec<String>,
    pub shipping_rates: Vec<ShippingRateConfig>,
}

impl StoreConfig {
    pub fn success_url(&self) -> String {
        format!(
            "{}/success.html?session_id={{CHECKOUT_SESSION_ID}}",
            self.base_url.trim_end_matches('/')
        )
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/cancel.html", self.base_url.trim_end_matches('/'))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            site: "hmenfashion.com".to_string(),
            base_url: "https://hmenfashion.com".to_string(),
            currency: "usd".to_string(),
            allowed_shipping_countries: vec!["US".to_string()],
            shipping_rates: vec![
                ShippingRateConfig {
                    display_name: "Standard Shipping (3–5 days)".to_string(),
                    amount: 995,
                    min_business_days: 3,
                    max_business_days: 5,
                },
                ShippingRateConfig {
                    display_name: "Express Shipping (1–2 days)".to_string(),
                    amount: 1995,
                    min_business_days: 1,
                    max_business_days: 2,
                },
            ],
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub store: StoreConfig,
    pub stripe: StripeConfig,
    pub database: DatabaseConfig,
}
