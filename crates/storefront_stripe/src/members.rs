//! Membership status lookup by email.

use crate::error::StripeError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use storefront_common::models::normalize_email;
use storefront_db::SubscriberRepository;
use tracing::debug;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

const NO_MEMBERSHIP: &str = "none";

/// Body of a member lookup (wrapped in the `ok` envelope).
#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MemberStatus {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub status: String,
    #[serde(rename = "isActive", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Present (possibly null) only for found members.
    #[serde(rename = "currentPeriodEnd", skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<Option<DateTime<Utc>>>,
}

impl MemberStatus {
    pub fn not_found() -> Self {
        Self {
            found: false,
            email: None,
            status: NO_MEMBERSHIP.to_string(),
            is_active: None,
            current_period_end: None,
        }
    }
}

/// Trims and lower-cases the queried email. Blank input is a validation error.
pub fn member_email(raw_email: Option<&str>) -> Result<String, StripeError> {
    let email = raw_email.map(normalize_email).unwrap_or_default();
    if email.is_empty() {
        return Err(StripeError::validation("Missing email"));
    }
    Ok(email)
}

/// Looks up the membership for an already normalised email.
pub async fn lookup_member(subscribers: &dyn SubscriberRepository, email: &str) -> Result<MemberStatus, StripeError> {
    let Some(subscriber) = subscribers.find_by_email(email).await? else {
        debug!(email = %email, "No subscriber record");
        return Ok(MemberStatus::not_found());
    };

    Ok(MemberStatus {
        found: true,
        is_active: Some(subscriber.is_active()),
        email: Some(subscriber.email),
        status: subscriber.status,
        current_period_end: Some(subscriber.current_period_end),
    })
}
