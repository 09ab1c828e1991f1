use crate::handlers::{
    create_checkout_session_handler, get_order_handler, get_session_email_handler, member_status_handler,
    options_handler, stripe_webhook_handler, StorefrontState,
};
use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

fn open_cors(methods: [Method; 2]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(methods)
        .allow_headers([CONTENT_TYPE])
}

/// Creates a router containing all storefront routes, relative to `/api`.
pub fn routes(state: Arc<StorefrontState>) -> Router {
    let checkout = Router::new()
        .route(
            "/create-checkout-session",
            post(create_checkout_session_handler).options(options_handler),
        )
        .layer(open_cors([Method::POST, Method::OPTIONS]));

    let order = Router::new()
        .route("/order", get(get_order_handler).options(options_handler))
        .layer(open_cors([Method::GET, Method::OPTIONS]));

    Router::new()
        .merge(checkout)
        .merge(order)
        .route("/get-session-email", get(get_session_email_handler))
        .route("/me", get(member_status_handler))
        .route("/stripe-webhook", post(stripe_webhook_handler))
        .with_state(state)
}
