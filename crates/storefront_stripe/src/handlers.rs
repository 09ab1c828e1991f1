use crate::checkout::{create_checkout_session, CreateCheckoutSessionRequest, CreateCheckoutSessionResponse};
use crate::client::StripeApi;
use crate::error::{StripeError, MISSING_DATABASE, MISSING_SECRET_KEY};
use crate::members::{lookup_member, member_email, MemberStatus};
use crate::orders::{lookup_order, lookup_session_email, required_param, OrderLookup, SessionEmail};
use crate::webhook::{construct_event, process_event, SIGNATURE_HEADER};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use storefront_common::{handle_envelope_result, HttpStatusCode, IntoHttpResponse, StorefrontError};
use storefront_config::AppConfig;
use storefront_db::{OrderRepository, Repositories, SubscriberRepository};
use tracing::{debug, error, warn};

// --- State for Storefront Handlers ---
// Every external handle is optional. A missing one fails only the handlers
// that need it, with a configuration error.
#[derive(Clone)]
pub struct StorefrontState {
    pub config: Arc<AppConfig>,
    pub stripe: Option<Arc<dyn StripeApi>>,
    pub orders: Option<Arc<dyn OrderRepository>>,
    pub subscribers: Option<Arc<dyn SubscriberRepository>>,
}

impl StorefrontState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            stripe: None,
            orders: None,
            subscribers: None,
        }
    }

    pub fn with_stripe(mut self, stripe: Arc<dyn StripeApi>) -> Self {
        self.stripe = Some(stripe);
        self
    }

    pub fn with_repositories(mut self, repositories: Repositories) -> Self {
        self.orders = Some(repositories.orders);
        self.subscribers = Some(repositories.subscribers);
        self
    }

    fn stripe_api(&self) -> Result<&dyn StripeApi, StripeError> {
        self.stripe.as_deref().ok_or_else(|| StripeError::config(MISSING_SECRET_KEY))
    }

    fn order_repository(&self) -> Result<&dyn OrderRepository, StripeError> {
        self.orders.as_deref().ok_or_else(|| StripeError::config(MISSING_DATABASE))
    }

    fn subscriber_repository(&self) -> Result<&dyn SubscriberRepository, StripeError> {
        self.subscribers.as_deref().ok_or_else(|| StripeError::config(MISSING_DATABASE))
    }
}

fn log_failure(operation: &str, err: &StripeError) {
    if err.status_code() < 500 {
        warn!(operation, error = %err, "Request rejected");
    } else {
        error!(operation, error = %err, "Request failed");
    }
}

fn envelope<T: serde::Serialize>(operation: &str, result: Result<T, StripeError>) -> Response {
    if let Err(err) = &result {
        log_failure(operation, err);
    }
    handle_envelope_result(result.map_err(StorefrontError::from))
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct SessionQuery {
    #[cfg_attr(feature = "openapi", param(example = "cs_test_a1..."))]
    pub session_id: Option<String>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct EmailQuery {
    #[cfg_attr(feature = "openapi", param(example = "ada@example.com"))]
    pub email: Option<String>,
}

/// Parses the checkout body. An empty body is an empty request.
fn parse_checkout_body(body: &[u8]) -> Result<CreateCheckoutSessionRequest, StripeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateCheckoutSessionRequest::default());
    }
    // a JSON `null` body asks for the defaults, same as no body
    serde_json::from_slice::<Option<CreateCheckoutSessionRequest>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| StripeError::validation(format!("Invalid JSON body: {}", e)))
}

async fn checkout(state: &StorefrontState, body: &[u8]) -> Result<CreateCheckoutSessionResponse, StripeError> {
    let stripe = state.stripe_api()?;
    let request = parse_checkout_body(body)?;
    create_checkout_session(stripe, &state.config, request).await
}

/// Creates a Stripe Checkout Session and returns its URL.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/create-checkout-session",
    request_body = CreateCheckoutSessionRequest,
    responses(
        (status = 200, description = "Checkout Session created", body = CreateCheckoutSessionResponse),
        (status = 400, description = "Invalid kind, items or JSON body"),
        (status = 500, description = "Missing configuration or Stripe API error")
    ),
    tag = "Checkout"
))]
pub async fn create_checkout_session_handler(State(state): State<Arc<StorefrontState>>, body: Bytes) -> Response {
    match checkout(&state, &body).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => {
            log_failure("create_checkout_session", &err);
            StorefrontError::from(err).into_http_response()
        }
    }
}

async fn order(state: &StorefrontState, query: SessionQuery) -> Result<OrderLookup, StripeError> {
    let session_id = required_param(query.session_id.as_deref(), "session_id")?;
    let orders = state.order_repository()?;
    lookup_order(
        orders,
        state.stripe.as_deref(),
        &session_id,
        state.config.stripe.line_items_limit,
    )
    .await
}

/// Returns the stored order for a session, creating it from Stripe on first lookup.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/order",
    params(SessionQuery),
    responses(
        (status = 200, description = "Order, or pending checkout status", body = OrderLookup),
        (status = 400, description = "Missing session_id"),
        (status = 500, description = "Missing configuration, Stripe or database error")
    ),
    tag = "Orders"
))]
pub async fn get_order_handler(State(state): State<Arc<StorefrontState>>, Query(query): Query<SessionQuery>) -> Response {
    envelope("order", order(&state, query).await)
}

async fn session_email(state: &StorefrontState, query: SessionQuery) -> Result<SessionEmail, StripeError> {
    let session_id = required_param(query.session_id.as_deref(), "session_id")?;
    lookup_session_email(state.stripe_api()?, &session_id).await
}

/// Returns the customer email recorded on a checkout session.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/get-session-email",
    params(SessionQuery),
    responses(
        (status = 200, description = "Session email, empty when unknown", body = SessionEmail),
        (status = 400, description = "Missing session_id"),
        (status = 500, description = "Missing configuration or Stripe API error")
    ),
    tag = "Orders"
))]
pub async fn get_session_email_handler(
    State(state): State<Arc<StorefrontState>>,
    Query(query): Query<SessionQuery>,
) -> Response {
    envelope("get_session_email", session_email(&state, query).await)
}

async fn member(state: &StorefrontState, query: EmailQuery) -> Result<MemberStatus, StripeError> {
    let email = member_email(query.email.as_deref())?;
    lookup_member(state.subscriber_repository()?, &email).await
}

/// Returns the membership status for an email.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/me",
    params(EmailQuery),
    responses(
        (status = 200, description = "Membership status", body = MemberStatus),
        (status = 400, description = "Missing email"),
        (status = 500, description = "Database not configured or unavailable")
    ),
    tag = "Members"
))]
pub async fn member_status_handler(State(state): State<Arc<StorefrontState>>, Query(query): Query<EmailQuery>) -> Response {
    envelope("me", member(&state, query).await)
}

/// Receives Stripe webhook deliveries.
///
/// Signature and payload errors answer 400 so Stripe stops retrying. Failures
/// after verification answer 500 so Stripe redelivers.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/stripe-webhook",
    request_body(content = String, description = "Raw event JSON as signed by Stripe"),
    responses(
        (status = 200, description = "Event acknowledged"),
        (status = 400, description = "Invalid signature or payload", content_type = "text/plain"),
        (status = 500, description = "Processing failed, Stripe will retry", content_type = "text/plain")
    ),
    tag = "Stripe Webhooks"
))]
pub async fn stripe_webhook_handler(
    State(state): State<Arc<StorefrontState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let sig_header = headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok());
    let stripe_config = &state.config.stripe;

    let event = match construct_event(
        &body,
        sig_header,
        stripe_config.webhook_secret.as_deref(),
        stripe_config.webhook_tolerance_secs,
        Utc::now().timestamp(),
    ) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "Stripe webhook verification failed");
            return (StatusCode::BAD_REQUEST, format!("Webhook Error: {}", err)).into_response();
        }
    };

    let event_id = event.id.clone();
    match process_event(event, state.stripe.as_deref(), state.subscribers.as_deref(), Utc::now()).await {
        Ok(outcome) => {
            debug!(event_id = %event_id, outcome = ?outcome, "Stripe webhook processed");
            (StatusCode::OK, Json(json!({ "received": true }))).into_response()
        }
        Err(err) => {
            error!(event_id = %event_id, error = %err, "Stripe webhook handler failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Webhook handler failed").into_response()
        }
    }
}

/// Answers non-preflight `OPTIONS` requests.
pub async fn options_handler() -> StatusCode {
    StatusCode::OK
}
