// --- File: crates/services/storefront_backend/src/app_state.rs ---
use std::sync::Arc;
use storefront_common::http::client::default_client;
use storefront_common::logging::log_result;
use storefront_config::AppConfig;
use storefront_db::{DbClient, Repositories};
use storefront_stripe::{HttpStripeClient, StorefrontState};
use tracing::{info, warn};

/// Application state shared by the backend's own routes.
///
/// The storefront handlers get their own [`StorefrontState`]; the database
/// handle is kept here as well for the health probe and shutdown.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Option<DbClient>,
    pub storefront: Arc<StorefrontState>,
}

impl AppState {
    /// Builds every external handle from configuration.
    ///
    /// Nothing here fails startup: a missing secret or database setting only
    /// disables the handlers that need it.
    pub async fn initialize(config: AppConfig) -> Self {
        let config = Arc::new(config);
        let mut storefront = StorefrontState::new(config.clone());

        let db = match DbClient::from_config(&config.database).await {
            Ok(db) => {
                // An unreachable server is not fatal here; the repositories
                // retry index creation before their first write.
                let _ = log_result(
                    db.ensure_indexes_once().await,
                    "Database indexes ready",
                    "Failed to ensure database indexes, retrying on first write",
                );
                storefront = storefront.with_repositories(Repositories::mongo(&db));
                Some(db)
            }
            Err(err) => {
                warn!(error = %err, "Database disabled");
                None
            }
        };

        match default_client() {
            Ok(http) => match HttpStripeClient::from_config(http, &config.stripe) {
                Ok(stripe) => {
                    info!(api_base = %config.stripe.api_base, "Stripe client ready");
                    storefront = storefront.with_stripe(Arc::new(stripe));
                }
                Err(err) => warn!(error = %err, "Stripe disabled"),
            },
            Err(err) => warn!(error = %err, "Failed to build HTTP client, Stripe disabled"),
        }

        if config.stripe.webhook_secret.is_none() {
            warn!("STRIPE_WEBHOOK_SECRET not set, webhook deliveries will be rejected");
        }

        Self {
            config,
            db,
            storefront: Arc::new(storefront),
        }
    }

    /// Wraps an already assembled storefront state, without a database handle.
    pub fn from_storefront(storefront: StorefrontState) -> Self {
        Self {
            config: storefront.config.clone(),
            db: None,
            storefront: Arc::new(storefront),
        }
    }
}
