//! Stripe webhook verification and processing.
//!
//! Stripe signs `"{t}.{raw body}"` with HMAC-SHA256 under the endpoint's
//! signing secret and sends `Stripe-Signature: t=<unix>,v1=<hex>[,v1=...]`.
//! Verification must run on the raw bytes, before any JSON parsing.

use crate::client::StripeApi;
use crate::error::{StripeError, MISSING_DATABASE, MISSING_SECRET_KEY};
use crate::models::{CheckoutSession, StripeEvent};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use storefront_common::models::{normalize_email, SubscriberRecord};
use storefront_db::SubscriberRepository;
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// What processing a verified event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Event type the storefront does not act on.
    Ignored,
    /// Completed checkout without a customer email.
    MissingEmail,
    /// Completed checkout that did not create a subscription.
    NoSubscription,
    /// Subscriber record written for this email.
    SubscriberSaved { email: String, status: String },
}

fn signature_error(message: impl Into<String>) -> StripeError {
    StripeError::WebhookSignatureError(message.into())
}

fn mac_for(secret: &str, timestamp: &str, payload: &[u8]) -> Result<HmacSha256, StripeError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| signature_error("Invalid webhook secret format for HMAC"))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Builds a `Stripe-Signature` header value for `payload`.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, StripeError> {
    let timestamp = timestamp.to_string();
    let signature = hex::encode(mac_for(secret, &timestamp, payload)?.finalize().into_bytes());
    Ok(format!("t={},v1={}", timestamp, signature))
}

/// Verifies a webhook signature header against the raw payload.
///
/// Accepts when any `v1` entry matches. Timestamps older than
/// `tolerance_secs` are rejected; a non-positive tolerance disables the check.
pub fn verify_signature(
    payload: &[u8],
    sig_header: Option<&str>,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), StripeError> {
    let header = sig_header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| signature_error("No stripe-signature header value was provided."))?;

    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();
    for item in header.split(',') {
        match item.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp_str = timestamp
        .ok_or_else(|| signature_error("Unable to extract timestamp and signatures from header"))?;
    let parsed_timestamp: i64 = timestamp_str
        .parse()
        .map_err(|_| signature_error("Unable to extract timestamp and signatures from header"))?;
    if signatures.is_empty() {
        return Err(signature_error("No signatures found with expected scheme"));
    }

    let mac = mac_for(secret, timestamp_str, payload)?;
    let matched = signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err(signature_error(
            "No signatures found matching the expected signature for payload.",
        ));
    }

    if tolerance_secs > 0 && now.saturating_sub(parsed_timestamp) > tolerance_secs {
        return Err(signature_error("Timestamp outside the tolerance zone"));
    }

    debug!(timestamp = parsed_timestamp, "Stripe webhook signature verified");
    Ok(())
}

/// Verifies the signature and parses the event.
///
/// Every failure here is permanent for the delivery and maps to a 400.
pub fn construct_event(
    payload: &[u8],
    sig_header: Option<&str>,
    secret: Option<&str>,
    tolerance_secs: i64,
    now: i64,
) -> Result<StripeEvent, StripeError> {
    let secret = secret
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| signature_error("Missing STRIPE_WEBHOOK_SECRET in env."))?;

    verify_signature(payload, sig_header, secret, tolerance_secs, now)?;

    serde_json::from_slice(payload).map_err(|e| signature_error(format!("Invalid webhook payload: {}", e)))
}

/// Acts on a verified event.
///
/// Only `checkout.session.completed` with both a customer email and a
/// subscription writes anything: the subscription is fetched from Stripe and
/// the subscriber is upserted by email. Later deliveries overwrite earlier
/// ones regardless of event order.
pub async fn process_event(
    event: StripeEvent,
    stripe: Option<&dyn StripeApi>,
    subscribers: Option<&dyn SubscriberRepository>,
    now: DateTime<Utc>,
) -> Result<WebhookOutcome, StripeError> {
    info!(event_id = %event.id, event_type = %event.event_type, "Processing Stripe event");

    if event.event_type != CHECKOUT_SESSION_COMPLETED {
        debug!(event_type = %event.event_type, "Unhandled Stripe event type");
        return Ok(WebhookOutcome::Ignored);
    }

    let session: CheckoutSession = serde_json::from_value(event.data.object).map_err(|e| {
        StripeError::WebhookProcessingError(format!("Failed to parse checkout session object: {}", e))
    })?;

    let email = session.customer_email().map(normalize_email).unwrap_or_default();
    if email.is_empty() {
        warn!(session_id = %session.id, "checkout.session.completed without customer email");
        return Ok(WebhookOutcome::MissingEmail);
    }

    let Some(subscription_id) = session.subscription.as_ref().and_then(|s| s.id()) else {
        info!(session_id = %session.id, "checkout.session.completed without subscription");
        return Ok(WebhookOutcome::NoSubscription);
    };

    let stripe = stripe.ok_or_else(|| StripeError::config(MISSING_SECRET_KEY))?;
    let subscribers = subscribers.ok_or_else(|| StripeError::config(MISSING_DATABASE))?;

    let subscription = stripe.retrieve_subscription(subscription_id).await?;
    let record = SubscriberRecord {
        id: None,
        email: email.clone(),
        stripe_customer_id: session.customer.as_ref().and_then(|c| c.id()).map(str::to_string),
        stripe_subscription_id: subscription.id.clone(),
        status: subscription.status.clone(),
        current_period_end: subscription
            .current_period_end
            .filter(|secs| *secs != 0)
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        updated_at: now,
    };
    subscribers.upsert_by_email(record).await?;

    info!(
        email = %email,
        subscription_id = %subscription.id,
        status = %subscription.status,
        "Subscription saved"
    );
    Ok(WebhookOutcome::SubscriberSaved {
        email,
        status: subscription.status,
    })
}
