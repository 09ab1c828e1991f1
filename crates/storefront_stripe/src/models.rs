//! Wire types for the parts of the Stripe API this crate reads.
//!
//! Only fields the storefront uses are declared; everything is optional
//! because Stripe omits or nulls fields depending on mode and expansion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use storefront_common::models::Address;

/// A field that is either an object id or, when expanded, the object itself.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Expandable {
    Id(String),
    Object(serde_json::Value),
}

impl Expandable {
    /// The referenced object's id, whether expanded or not.
    pub fn id(&self) -> Option<&str> {
        match self {
            Expandable::Id(id) => Some(id),
            Expandable::Object(object) => object.get("id").and_then(|v| v.as_str()),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct CustomerDetails {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ShippingDetails {
    pub name: Option<String>,
    pub address: Option<Address>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct TotalDetails {
    pub amount_tax: Option<i64>,
    pub amount_shipping: Option<i64>,
    pub amount_discount: Option<i64>,
}

/// A Checkout Session as returned by `GET /v1/checkout/sessions/{id}` and
/// carried in `checkout.session.*` events.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    pub mode: Option<String>,
    /// "open", "complete" or "expired"
    pub status: Option<String>,
    /// "paid", "unpaid" or "no_payment_required"
    pub payment_status: Option<String>,
    pub currency: Option<String>,
    pub amount_subtotal: Option<i64>,
    pub amount_total: Option<i64>,
    pub total_details: Option<TotalDetails>,
    pub customer_details: Option<CustomerDetails>,
    pub shipping_details: Option<ShippingDetails>,
    pub metadata: Option<BTreeMap<String, String>>,
    /// Unix seconds
    pub created: Option<i64>,
    pub customer: Option<Expandable>,
    pub subscription: Option<Expandable>,
    pub payment_intent: Option<Expandable>,
    pub url: Option<String>,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }

    pub fn is_complete(&self) -> bool {
        self.status.as_deref() == Some("complete")
    }

    /// `customer_details.email` as reported, if present and non-empty.
    pub fn customer_email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|details| details.email.as_deref())
            .filter(|email| !email.trim().is_empty())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Price {
    pub id: String,
    pub unit_amount: Option<i64>,
    pub currency: Option<String>,
    pub product: Option<Expandable>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LineItem {
    pub id: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub amount_subtotal: Option<i64>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub price: Option<Price>,
}

/// Stripe's paginated list envelope.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StripeList<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: String,
    pub status: String,
    /// Unix seconds
    pub current_period_end: Option<i64>,
    pub customer: Option<Expandable>,
}

/// Represents the `data` field within a Stripe Event.
#[derive(Deserialize, Debug, Clone)]
pub struct StripeEventData {
    /// Shape depends on the event type.
    pub object: serde_json::Value,
}

/// Represents the outer Stripe Event object.
#[derive(Deserialize, Debug, Clone)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: i64,
    pub data: StripeEventData,
}

/// Response from `POST /v1/checkout/sessions`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CheckoutSessionCreated {
    pub id: String,
    pub url: Option<String>,
}
