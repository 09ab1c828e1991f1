//! Checkout session creation.
//!
//! The storefront posts loosely typed JSON. Items are coerced the way the
//! front-end expects: a missing or falsy field takes its default and numeric
//! strings are accepted. The result is a typed [`CheckoutSessionParams`]
//! that the client encodes as Stripe form fields.

use crate::client::StripeApi;
use crate::error::StripeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use storefront_common::models::normalize_email;
use storefront_config::{AppConfig, StoreConfig};
use tracing::info;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Smallest unit amount Stripe accepts for a card charge, in minor units.
pub const MIN_UNIT_AMOUNT: f64 = 50.0;

const DEFAULT_ITEM_NAME: &str = "Item";

/// Request from the storefront to create a Checkout Session.
#[derive(Deserialize, Debug, Default, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateCheckoutSessionRequest {
    /// "subscription" (default) or "payment"
    #[cfg_attr(feature = "openapi", schema(example = "payment"))]
    #[serde(default)]
    pub kind: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "ada@example.com"))]
    #[serde(rename = "customerEmail", default)]
    pub customer_email: Option<Value>,
    /// `[{name, unitAmount, qty, sku}]`, payment mode only.
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<Object>>))]
    #[serde(default)]
    pub items: Option<Value>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateCheckoutSessionResponse {
    #[cfg_attr(
        feature = "openapi",
        schema(example = "https://checkout.stripe.com/c/pay/cs_test_a1...")
    )]
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutKind {
    Subscription,
    Payment,
}

impl CheckoutKind {
    pub fn parse(kind: Option<&str>) -> Result<Self, StripeError> {
        match kind {
            None | Some("subscription") => Ok(CheckoutKind::Subscription),
            Some("payment") => Ok(CheckoutKind::Payment),
            Some(other) => Err(StripeError::validation(format!(
                "Unsupported checkout kind \"{}\". Use \"subscription\" or \"payment\".",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutKind::Subscription => "subscription",
            CheckoutKind::Payment => "payment",
        }
    }
}

/// One checkout line, either a catalogue price or inline price data.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutLine {
    Price {
        price_id: String,
        quantity: i64,
    },
    Custom {
        name: String,
        sku: String,
        currency: String,
        unit_amount: i64,
        quantity: i64,
    },
}

impl CheckoutLine {
    pub fn quantity(&self) -> i64 {
        match self {
            CheckoutLine::Price { quantity, .. } | CheckoutLine::Custom { quantity, .. } => *quantity,
        }
    }

    /// Line amount for inline-priced lines; catalogue prices are unknown here.
    pub fn amount(&self) -> Option<i64> {
        match self {
            CheckoutLine::Price { .. } => None,
            CheckoutLine::Custom {
                unit_amount,
                quantity,
                ..
            } => Some(unit_amount * quantity),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShippingRate {
    pub display_name: String,
    pub amount: i64,
    pub currency: String,
    pub min_business_days: u32,
    pub max_business_days: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShippingOptions {
    pub allowed_countries: Vec<String>,
    pub rates: Vec<ShippingRate>,
}

/// Everything sent to `POST /v1/checkout/sessions`.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionParams {
    pub mode: CheckoutKind,
    pub line_items: Vec<CheckoutLine>,
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
    pub shipping: Option<ShippingOptions>,
    pub metadata: BTreeMap<String, String>,
}

impl CheckoutSessionParams {
    /// Encodes the parameters as Stripe's bracketed form fields.
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".to_string(), self.mode.as_str().to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            ("phone_number_collection[enabled]".to_string(), "true".to_string()),
            ("billing_address_collection".to_string(), "required".to_string()),
        ];

        for (i, line) in self.line_items.iter().enumerate() {
            let key = |field: &str| format!("line_items[{}]{}", i, field);
            match line {
                CheckoutLine::Price { price_id, quantity } => {
                    form.push((key("[price]"), price_id.clone()));
                    form.push((key("[quantity]"), quantity.to_string()));
                }
                CheckoutLine::Custom {
                    name,
                    sku,
                    currency,
                    unit_amount,
                    quantity,
                } => {
                    form.push((key("[price_data][currency]"), currency.clone()));
                    form.push((key("[price_data][unit_amount]"), unit_amount.to_string()));
                    form.push((key("[price_data][product_data][name]"), name.clone()));
                    form.push((key("[price_data][product_data][metadata][sku]"), sku.clone()));
                    form.push((key("[quantity]"), quantity.to_string()));
                }
            }
        }

        if let Some(email) = &self.customer_email {
            form.push(("customer_email".to_string(), email.clone()));
        }

        if let Some(shipping) = &self.shipping {
            for (i, country) in shipping.allowed_countries.iter().enumerate() {
                form.push((
                    format!("shipping_address_collection[allowed_countries][{}]", i),
                    country.clone(),
                ));
            }
            for (i, rate) in shipping.rates.iter().enumerate() {
                let key = |field: &str| format!("shipping_options[{}][shipping_rate_data]{}", i, field);
                form.push((key("[type]"), "fixed_amount".to_string()));
                form.push((key("[fixed_amount][amount]"), rate.amount.to_string()));
                form.push((key("[fixed_amount][currency]"), rate.currency.clone()));
                form.push((key("[display_name]"), rate.display_name.clone()));
                form.push((key("[delivery_estimate][minimum][unit]"), "business_day".to_string()));
                form.push((key("[delivery_estimate][minimum][value]"), rate.min_business_days.to_string()));
                form.push((key("[delivery_estimate][maximum][unit]"), "business_day".to_string()));
                form.push((key("[delivery_estimate][maximum][value]"), rate.max_business_days.to_string()));
            }
        }

        for (key, value) in &self.metadata {
            form.push((format!("metadata[{}]", key), value.clone()));
        }

        form
    }
}

// --- Loose JSON coercion ---

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric value of a truthy field, or `default` when absent or falsy.
/// Unparseable input yields NaN.
fn number_or(value: Option<&Value>, default: f64) -> f64 {
    match value.filter(|v| is_truthy(v)) {
        None => default,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Some(Value::Bool(_)) => 1.0,
        Some(_) => f64::NAN,
    }
}

/// Text of a truthy field, or an empty string.
fn text_of(value: Option<&Value>) -> String {
    match value.filter(|v| is_truthy(v)) {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Normalises the optional customer email: kept only when it is a string
/// containing `@`, then trimmed and lower-cased.
pub fn normalize_customer_email(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(raw)) if raw.contains('@') => Some(normalize_email(raw)),
        _ => None,
    }
}

/// Validates and normalises one loosely typed item into a checkout line.
pub fn normalize_item(item: &Value, currency: &str) -> Result<CheckoutLine, StripeError> {
    let name = text_of(item.get("name")).trim().to_string();
    let name = if name.is_empty() {
        DEFAULT_ITEM_NAME.to_string()
    } else {
        name
    };
    let qty = number_or(item.get("qty"), 1.0);
    let unit_amount = number_or(item.get("unitAmount"), 0.0);

    if !qty.is_finite() || qty < 1.0 {
        return Err(StripeError::validation("Invalid qty in items"));
    }
    if !unit_amount.is_finite() || unit_amount < MIN_UNIT_AMOUNT {
        return Err(StripeError::validation(
            "Invalid unitAmount in items (must be >= 50 cents)",
        ));
    }

    Ok(CheckoutLine::Custom {
        name,
        sku: text_of(item.get("sku")),
        currency: currency.to_string(),
        unit_amount: unit_amount.round() as i64,
        quantity: qty.round() as i64,
    })
}

/// Builds the session parameters for a request.
///
/// Validation happens here, before any call to Stripe.
pub fn build_checkout_params(
    request: &CreateCheckoutSessionRequest,
    store: &StoreConfig,
    subscription_price_id: Option<&str>,
) -> Result<CheckoutSessionParams, StripeError> {
    let kind = CheckoutKind::parse(request.kind.as_deref())?;
    let customer_email = normalize_customer_email(request.customer_email.as_ref());

    let mut metadata = BTreeMap::new();
    metadata.insert("site".to_string(), store.site.clone());
    metadata.insert("kind".to_string(), kind.as_str().to_string());
    metadata.insert("email".to_string(), customer_email.clone().unwrap_or_default());

    let mut params = CheckoutSessionParams {
        mode: kind,
        line_items: Vec::new(),
        customer_email,
        success_url: store.success_url(),
        cancel_url: store.cancel_url(),
        shipping: None,
        metadata,
    };

    match kind {
        CheckoutKind::Subscription => {
            let price_id = subscription_price_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .ok_or_else(|| StripeError::config("Missing STRIPE_SUBSCRIPTION_PRICE_ID in env."))?;
            params.line_items.push(CheckoutLine::Price {
                price_id: price_id.to_string(),
                quantity: 1,
            });
            params.metadata.insert("plan".to_string(), "membership".to_string());
        }
        CheckoutKind::Payment => {
            let items = match request.items.as_ref() {
                Some(Value::Array(items)) if !items.is_empty() => items,
                _ => {
                    return Err(StripeError::validation(
                        "Missing items for payment checkout. Send items: [{name, unitAmount, qty}]",
                    ))
                }
            };
            let currency = store.currency.to_lowercase();
            params.line_items = items
                .iter()
                .map(|item| normalize_item(item, &currency))
                .collect::<Result<_, _>>()?;
            params.shipping = Some(ShippingOptions {
                allowed_countries: store.allowed_shipping_countries.clone(),
                rates: store
                    .shipping_rates
                    .iter()
                    .map(|rate| ShippingRate {
                        display_name: rate.display_name.clone(),
                        amount: rate.amount,
                        currency: currency.clone(),
                        min_business_days: rate.min_business_days,
                        max_business_days: rate.max_business_days,
                    })
                    .collect(),
            });
            params.metadata.insert("items_count".to_string(), items.len().to_string());
        }
    }

    Ok(params)
}

/// Creates a Stripe Checkout Session and returns its hosted URL.
pub async fn create_checkout_session(
    stripe: &dyn StripeApi,
    config: &AppConfig,
    request: CreateCheckoutSessionRequest,
) -> Result<CreateCheckoutSessionResponse, StripeError> {
    let params = build_checkout_params(
        &request,
        &config.store,
        config.stripe.subscription_price_id.as_deref(),
    )?;

    info!(
        kind = params.mode.as_str(),
        lines = params.line_items.len(),
        has_email = params.customer_email.is_some(),
        "Creating Stripe Checkout Session"
    );

    let created = stripe.create_checkout_session(params).await?;
    let url = created.url.ok_or_else(|| {
        StripeError::InternalError(format!(
            "Stripe response missing checkout URL for session {}",
            created.id
        ))
    })?;

    info!(session_id = %created.id, "Stripe Checkout Session created");
    Ok(CreateCheckoutSessionResponse { url })
}
