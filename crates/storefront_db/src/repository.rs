//! Repository traits for database access
//!
//! Handlers only see these traits. Both writes are a single atomic
//! insert-or-update keyed by a unique field; there is no read-then-write.

use crate::error::DbError;
use storefront_common::models::{OrderRecord, SubscriberRecord};
use storefront_common::BoxFuture;

/// Storage for orders, keyed by Stripe checkout session id.
pub trait OrderRepository: Send + Sync {
    /// Reads the order stored for a session, if any.
    fn find_by_session_id(&self, session_id: &str) -> BoxFuture<'_, Option<OrderRecord>, DbError>;

    /// Inserts or updates the order keyed by `order.stripe_session_id`.
    ///
    /// `created_at` is only written on insert. Every other field, including
    /// `updated_at`, replaces the stored value. `order.id` is ignored.
    fn upsert_by_session_id(&self, order: OrderRecord) -> BoxFuture<'_, (), DbError>;
}

/// Storage for subscribers, keyed by lower-cased email.
pub trait SubscriberRepository: Send + Sync {
    /// Reads the subscriber stored for an already normalised email, if any.
    fn find_by_email(&self, email: &str) -> BoxFuture<'_, Option<SubscriberRecord>, DbError>;

    /// Inserts or overwrites the subscriber keyed by `subscriber.email`.
    fn upsert_by_email(&self, subscriber: SubscriberRecord) -> BoxFuture<'_, (), DbError>;
}
