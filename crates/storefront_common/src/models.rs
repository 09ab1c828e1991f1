// --- File: crates/storefront_common/src/models.rs ---

// Data structures shared by the database layer and the HTTP handlers.
// Serialized field names match the persisted documents, which are also the
// shapes returned to the front-end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Subscription statuses that grant membership.
pub const ACTIVE_STATUSES: [&str; 2] = ["active", "trialing"];

/// Trims and lower-cases an email address used as a lookup key.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Customer details captured by checkout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct OrderCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Postal address as reported by Stripe.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct OrderShipping {
    pub name: String,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OrderItemPrice {
    pub id: String,
    pub unit_amount: i64,
    pub currency: String,
    pub product: Option<String>,
}

/// One purchased line of an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OrderItem {
    pub description: String,
    pub quantity: i64,
    pub amount_subtotal: i64,
    pub amount_total: i64,
    pub currency: String,
    pub price: Option<OrderItemPrice>,
}

/// A completed checkout, keyed by its Stripe session id.
///
/// Amounts are integer minor units. `created_at` is set once on first
/// insert; every later upsert refreshes the remaining fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OrderRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "stripeSessionId")]
    pub stripe_session_id: String,
    pub mode: String,
    pub status: String,
    pub payment_status: String,
    pub currency: String,
    pub amount_subtotal: i64,
    pub amount_total: i64,
    pub amount_tax: i64,
    pub amount_shipping: i64,
    pub amount_discount: i64,
    pub customer: OrderCustomer,
    pub shipping: OrderShipping,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub stripe_created: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Membership state of one customer, keyed by lower-cased email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubscriberRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    #[serde(rename = "stripeCustomerId", default)]
    pub stripe_customer_id: Option<String>,
    #[serde(rename = "stripeSubscriptionId", default)]
    pub stripe_subscription_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "currentPeriodEnd", default)]
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl SubscriberRecord {
    pub fn is_active(&self) -> bool {
        ACTIVE_STATUSES.contains(&self.status.as_str())
    }
}

/// The item payload the storefront sends to checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CheckoutItemPayload {
    pub name: String,
    #[serde(rename = "unitAmount")]
    pub unit_amount: i64,
    pub qty: u32,
    pub sku: String,
}

/// A product line held in the shopper's cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CartLineItem {
    pub id: String,
    pub title: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub size: Option<String>,
    pub qty: u32,
    /// Unit price in major units, as displayed.
    pub price: f64,
    /// Unit price in minor units; always `round(price * 100)`.
    #[serde(rename = "unitAmount")]
    pub unit_amount: i64,
}

impl CartLineItem {
    pub const MIN_QTY: u32 = 1;
    pub const MAX_QTY: u32 = 99;

    pub fn new(id: impl Into<String>, title: impl Into<String>, price: f64, qty: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: None,
            subcategory: None,
            size: None,
            qty: Self::clamp_qty(qty),
            price,
            unit_amount: to_minor_units(price),
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>, subcategory: Option<String>) -> Self {
        self.category = Some(category.into());
        self.subcategory = subcategory;
        self
    }

    /// Sets the quantity, clamped to `MIN_QTY..=MAX_QTY`.
    pub fn set_qty(&mut self, qty: i64) {
        self.qty = Self::clamp_qty(qty);
    }

    /// Adds to the quantity, clamped to `MIN_QTY..=MAX_QTY`.
    pub fn add_qty(&mut self, delta: i64) {
        self.set_qty(i64::from(self.qty) + delta);
    }

    pub fn line_total(&self) -> i64 {
        self.unit_amount * i64::from(self.qty)
    }

    pub fn to_checkout_item(&self) -> CheckoutItemPayload {
        CheckoutItemPayload {
            name: self.title.clone(),
            unit_amount: self.unit_amount,
            qty: self.qty,
            sku: self.id.clone(),
        }
    }

    fn clamp_qty(qty: i64) -> u32 {
        qty.clamp(i64::from(Self::MIN_QTY), i64::from(Self::MAX_QTY)) as u32
    }
}

/// Converts a major-unit price to minor units.
pub fn to_minor_units(price: f64) -> i64 {
    (price * 100.0).round() as i64
}
