//! Test fixtures for the storefront HTTP tests
//!
//! A scripted [`FakeStripe`] stands in for the Stripe API and the in-memory
//! repositories stand in for MongoDB, so the full router can be driven with
//! `oneshot` requests.

#![allow(dead_code)]

use axum::{body::Body, http::Request, Router};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use storefront_common::BoxFuture;
use storefront_config::{AppConfig, StripeConfig};
use storefront_db::repositories::memory::{MemoryOrderRepository, MemorySubscriberRepository};
use storefront_stripe::checkout::CheckoutSessionParams;
use storefront_stripe::models::{CheckoutSession, CheckoutSessionCreated, LineItem, Subscription};
use storefront_stripe::webhook::sign_payload;
use storefront_stripe::{routes, StorefrontState, StripeApi, StripeError};

pub const WEBHOOK_SECRET: &str = "whsec_test_fixture";
pub const PRICE_ID: &str = "price_membership_test";

/// Scripted Stripe API that records what it was asked.
#[derive(Default)]
pub struct FakeStripe {
    pub session: Mutex<Option<CheckoutSession>>,
    pub line_items: Mutex<Vec<LineItem>>,
    pub subscription: Mutex<Option<Subscription>>,
    pub created_params: Mutex<Vec<CheckoutSessionParams>>,
    pub checkout_error: Mutex<Option<String>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeStripe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, session: CheckoutSession) -> Self {
        *self.session.lock().unwrap() = Some(session);
        self
    }

    pub fn with_line_items(self, items: Vec<LineItem>) -> Self {
        *self.line_items.lock().unwrap() = items;
        self
    }

    pub fn with_subscription(self, subscription: Subscription) -> Self {
        *self.subscription.lock().unwrap() = Some(subscription);
        self
    }

    /// Makes session creation fail with Stripe's `message`.
    pub fn failing_checkout(self, message: &str) -> Self {
        *self.checkout_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls().iter().filter(|call| call.as_str() == name).count()
    }

    pub fn last_params(&self) -> Option<CheckoutSessionParams> {
        self.created_params.lock().unwrap().last().cloned()
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn not_found(what: &str, id: &str) -> StripeError {
        StripeError::ApiError {
            status_code: 404,
            message: format!("No such {}: '{}'", what, id),
        }
    }
}

impl StripeApi for FakeStripe {
    fn create_checkout_session(
        &self,
        params: CheckoutSessionParams,
    ) -> BoxFuture<'_, CheckoutSessionCreated, StripeError> {
        self.record("create_checkout_session");
        self.created_params.lock().unwrap().push(params);
        let result = match self.checkout_error.lock().unwrap().clone() {
            Some(message) => Err(StripeError::ApiError {
                status_code: 400,
                message,
            }),
            None => Ok(CheckoutSessionCreated {
                id: "cs_test_created".to_string(),
                url: Some("https://checkout.stripe.test/c/pay/cs_test_created".to_string()),
            }),
        };
        Box::pin(async move { result })
    }

    fn retrieve_checkout_session(
        &self,
        session_id: &str,
        _expand: &[&str],
    ) -> BoxFuture<'_, CheckoutSession, StripeError> {
        self.record("retrieve_checkout_session");
        let result = self
            .session
            .lock()
            .unwrap()
            .clone()
            .filter(|session| session.id == session_id)
            .ok_or_else(|| Self::not_found("checkout.session", session_id));
        Box::pin(async move { result })
    }

    fn list_line_items(&self, _session_id: &str, _limit: u8) -> BoxFuture<'_, Vec<LineItem>, StripeError> {
        self.record("list_line_items");
        let items = self.line_items.lock().unwrap().clone();
        Box::pin(async move { Ok(items) })
    }

    fn retrieve_subscription(&self, subscription_id: &str) -> BoxFuture<'_, Subscription, StripeError> {
        self.record("retrieve_subscription");
        let result = self
            .subscription
            .lock()
            .unwrap()
            .clone()
            .filter(|subscription| subscription.id == subscription_id)
            .ok_or_else(|| Self::not_found("subscription", subscription_id));
        Box::pin(async move { result })
    }
}

/// Creates an AppConfig with test secrets and the default store settings.
pub fn create_test_config() -> AppConfig {
    AppConfig {
        stripe: StripeConfig {
            secret_key: Some("sk_test_fixture".to_string()),
            webhook_secret: Some(WEBHOOK_SECRET.to_string()),
            subscription_price_id: Some(PRICE_ID.to_string()),
            ..StripeConfig::default()
        },
        ..AppConfig::default()
    }
}

/// Handles shared between a test and the router under test.
pub struct TestApp {
    pub router: Router,
    pub stripe: Arc<FakeStripe>,
    pub orders: Arc<MemoryOrderRepository>,
    pub subscribers: Arc<MemorySubscriberRepository>,
}

/// Builds the router over a fake Stripe and empty in-memory repositories.
pub fn create_test_app(config: AppConfig, stripe: FakeStripe) -> TestApp {
    let stripe = Arc::new(stripe);
    let orders = Arc::new(MemoryOrderRepository::new());
    let subscribers = Arc::new(MemorySubscriberRepository::new());

    let mut state = StorefrontState::new(Arc::new(config)).with_stripe(stripe.clone());
    state.orders = Some(orders.clone());
    state.subscribers = Some(subscribers.clone());

    TestApp {
        router: routes(Arc::new(state)),
        stripe,
        orders,
        subscribers,
    }
}

/// Builds the router with no Stripe client and no database.
pub fn create_unconfigured_app() -> Router {
    routes(Arc::new(StorefrontState::new(Arc::new(AppConfig::default()))))
}

/// A paid payment-mode session as Stripe returns it with expansions.
pub fn paid_session(session_id: &str) -> CheckoutSession {
    serde_json::from_value(json!({
        "id": session_id,
        "mode": "payment",
        "status": "complete",
        "payment_status": "paid",
        "currency": "usd",
        "amount_subtotal": 5800,
        "amount_total": 6795,
        "total_details": {"amount_tax": 0, "amount_shipping": 995, "amount_discount": 0},
        "customer_details": {"name": "Ada Lovelace", "email": "Ada@Example.com", "phone": null},
        "metadata": {"site": "hmenfashion.com", "kind": "payment", "email": "ada@example.com"},
        "created": 1_700_000_000
    }))
    .unwrap()
}

pub fn open_session(session_id: &str) -> CheckoutSession {
    CheckoutSession {
        id: session_id.to_string(),
        mode: Some("payment".to_string()),
        status: Some("open".to_string()),
        payment_status: Some("unpaid".to_string()),
        ..CheckoutSession::default()
    }
}

pub fn tie_line_items() -> Vec<LineItem> {
    serde_json::from_value(json!([{
        "id": "li_tie",
        "description": "Tie",
        "quantity": 2,
        "amount_subtotal": 5800,
        "amount_total": 5800,
        "currency": "usd",
        "price": {"id": "price_tie", "unit_amount": 2900, "currency": "usd", "product": "prod_tie"}
    }]))
    .unwrap()
}

pub fn active_subscription(subscription_id: &str) -> Subscription {
    Subscription {
        id: subscription_id.to_string(),
        status: "active".to_string(),
        current_period_end: Some(1_900_000_000),
        customer: None,
    }
}

/// `checkout.session.completed` event body for the given session object.
pub fn completed_event(session_object: Value) -> String {
    json!({
        "id": "evt_test_1",
        "object": "event",
        "type": "checkout.session.completed",
        "created": Utc::now().timestamp(),
        "data": {"object": session_object}
    })
    .to_string()
}

/// A webhook POST signed with [`WEBHOOK_SECRET`] at the current time.
pub fn signed_webhook_request(body: &str) -> Request<Body> {
    let signature = sign_payload(body.as_bytes(), WEBHOOK_SECRET, Utc::now().timestamp()).unwrap();
    Request::builder()
        .method("POST")
        .uri("/stripe-webhook")
        .header("content-type", "application/json")
        .header("stripe-signature", signature)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Reads a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
