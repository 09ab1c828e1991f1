//! Order and session lookups for the post-checkout pages.
//!
//! Orders are read from the database first. On a miss the session is fetched
//! from Stripe and, once paid or complete, persisted with a single upsert
//! keyed by session id and read back.

use crate::client::StripeApi;
use crate::error::{StripeError, MISSING_SECRET_KEY};
use crate::models::{CheckoutSession, LineItem};
use chrono::{DateTime, Utc};
use serde::Serialize;
use storefront_common::models::{
    normalize_email, OrderCustomer, OrderItem, OrderItemPrice, OrderRecord, OrderShipping,
};
use storefront_db::OrderRepository;
use tracing::{debug, info};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Fields expanded when retrieving a session for an order.
pub const ORDER_SESSION_EXPAND: [&str; 3] = ["payment_intent", "customer", "subscription"];

const DEFAULT_CURRENCY: &str = "usd";

const NOT_COMPLETED_MESSAGE: &str = "Checkout not completed/paid yet.";

/// Where an order lookup found its answer.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum OrderSource {
    #[serde(rename = "db")]
    Database,
    #[serde(rename = "stripe")]
    Stripe,
    #[serde(rename = "stripe->db")]
    StripeToDatabase,
}

/// Body of a successful order lookup (wrapped in the `ok` envelope).
#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct OrderLookup {
    pub order: Option<OrderRecord>,
    pub source: OrderSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OrderLookup {
    pub(crate) fn found(order: OrderRecord, source: OrderSource) -> Self {
        Self {
            order: Some(order),
            source,
            status: None,
            payment_status: None,
            message: None,
        }
    }

    pub(crate) fn pending(session: &CheckoutSession) -> Self {
        Self {
            order: None,
            source: OrderSource::Stripe,
            status: Some(session.status.clone()),
            payment_status: Some(session.payment_status.clone()),
            message: Some(NOT_COMPLETED_MESSAGE.to_string()),
        }
    }
}

/// Body of a session email lookup.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SessionEmail {
    pub email: String,
}

/// Trims a query parameter, rejecting a missing or blank value.
pub fn required_param(value: Option<&str>, name: &str) -> Result<String, StripeError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StripeError::validation(format!("Missing {}", name)))
}

fn lower_or(value: Option<&str>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .trim()
        .to_lowercase()
}

fn order_item(line: &LineItem, session_currency: &str) -> OrderItem {
    OrderItem {
        description: line.description.clone().unwrap_or_default(),
        quantity: line.quantity.filter(|q| *q != 0).unwrap_or(1),
        amount_subtotal: line.amount_subtotal.unwrap_or(0),
        amount_total: line.amount_total.unwrap_or(0),
        currency: lower_or(line.currency.as_deref(), session_currency),
        price: line.price.as_ref().map(|price| OrderItemPrice {
            id: price.id.clone(),
            unit_amount: price.unit_amount.unwrap_or(0),
            currency: lower_or(price.currency.as_deref(), session_currency),
            product: price.product.as_ref().and_then(|p| p.id()).map(str::to_string),
        }),
    }
}

/// Assembles the stored order for a paid or complete session.
///
/// `now` becomes both `createdAt` and `updatedAt`; the repository keeps the
/// first `createdAt` on later upserts.
pub fn build_order_record(session: &CheckoutSession, line_items: &[LineItem], now: DateTime<Utc>) -> OrderRecord {
    let currency = lower_or(session.currency.as_deref(), DEFAULT_CURRENCY);
    let customer = session.customer_details.clone().unwrap_or_default();
    let shipping = session.shipping_details.clone().unwrap_or_default();
    let totals = session.total_details.clone().unwrap_or_default();

    OrderRecord {
        id: None,
        stripe_session_id: session.id.clone(),
        mode: session.mode.clone().unwrap_or_default(),
        status: session.status.clone().unwrap_or_default(),
        payment_status: session.payment_status.clone().unwrap_or_default(),
        currency: currency.clone(),
        amount_subtotal: session.amount_subtotal.unwrap_or(0),
        amount_total: session.amount_total.unwrap_or(0),
        amount_tax: totals.amount_tax.unwrap_or(0),
        amount_shipping: totals.amount_shipping.unwrap_or(0),
        amount_discount: totals.amount_discount.unwrap_or(0),
        customer: OrderCustomer {
            name: customer
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .or_else(|| shipping.name.clone())
                .unwrap_or_default(),
            email: customer.email.as_deref().map(normalize_email).unwrap_or_default(),
            phone: customer.phone.clone().unwrap_or_default(),
        },
        shipping: OrderShipping {
            name: shipping.name.clone().unwrap_or_default(),
            address: shipping.address.clone(),
        },
        items: line_items.iter().map(|line| order_item(line, &currency)).collect(),
        metadata: session.metadata.clone().unwrap_or_default(),
        stripe_created: session
            .created
            .filter(|secs| *secs != 0)
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        created_at: now,
        updated_at: now,
    }
}

/// Looks up the order for a checkout session, creating it from Stripe when
/// the database has none yet.
pub async fn lookup_order(
    orders: &dyn OrderRepository,
    stripe: Option<&dyn StripeApi>,
    session_id: &str,
    line_items_limit: u8,
) -> Result<OrderLookup, StripeError> {
    if let Some(existing) = orders.find_by_session_id(session_id).await? {
        debug!(session_id, "Order served from database");
        return Ok(OrderLookup::found(existing, OrderSource::Database));
    }

    let stripe = stripe.ok_or_else(|| StripeError::config(MISSING_SECRET_KEY))?;
    let session = stripe
        .retrieve_checkout_session(session_id, &ORDER_SESSION_EXPAND)
        .await?;

    if !session.is_paid() && !session.is_complete() {
        info!(
            session_id,
            status = ?session.status,
            payment_status = ?session.payment_status,
            "Checkout session not completed yet, order not stored"
        );
        return Ok(OrderLookup::pending(&session));
    }

    let line_items = stripe.list_line_items(session_id, line_items_limit).await?;
    let record = build_order_record(&session, &line_items, Utc::now());
    orders.upsert_by_session_id(record).await?;

    let saved = orders.find_by_session_id(&session.id).await?.ok_or_else(|| {
        StripeError::InternalError(format!("Order for session {} missing after upsert", session.id))
    })?;
    info!(
        session_id,
        amount_total = saved.amount_total,
        items = saved.items.len(),
        "Order stored from Stripe session"
    );
    Ok(OrderLookup::found(saved, OrderSource::StripeToDatabase))
}

/// Email for a checkout session: `customer_details.email`, then
/// `metadata.email`, else empty.
pub async fn lookup_session_email(stripe: &dyn StripeApi, session_id: &str) -> Result<SessionEmail, StripeError> {
    let session = stripe.retrieve_checkout_session(session_id, &[]).await?;
    let email = session
        .customer_email()
        .map(str::to_string)
        .or_else(|| {
            session
                .metadata
                .as_ref()
                .and_then(|m| m.get("email"))
                .filter(|e| !e.is_empty())
                .cloned()
        })
        .unwrap_or_default();
    Ok(SessionEmail { email })
}
