//! Storefront backend service
//!
//! Assembles the storefront routes, health probes, request tracing, the
//! optional static front-end and the optional Swagger UI into one router.

pub mod app_state;
pub mod health;

use app_state::AppState;
use axum::{routing::get, Router};
use health::{health_db_handler, health_handler};
use storefront_stripe::routes as storefront_routes;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Builds the complete application router.
pub fn app(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();

    let health_router = Router::new()
        .route("/health", get(health_handler))
        .route("/health/db", get(health_db_handler))
        .with_state(state.clone());

    let api_router = Router::new().nest(
        "/api",
        health_router.merge(storefront_routes(state.storefront.clone())),
    );

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = api_router;

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use storefront_stripe::doc::StorefrontApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Storefront API",
                version = "0.1.0",
                description = "Checkout, orders, membership and Stripe webhook endpoints",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(StorefrontApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");
        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    let app = match static_dir {
        Some(dir) => {
            info!(static_dir = %dir, "Serving static files");
            app.fallback_service(ServeDir::new(dir))
        }
        None => app,
    };

    app.layer(TraceLayer::new_for_http())
}
