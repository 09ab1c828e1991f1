//! In-memory repositories
//!
//! Same keying and upsert rules as the MongoDB repositories, held in a
//! mutex-guarded map. Used by tests and by local runs without a database.

use crate::error::DbError;
use crate::repository::{OrderRepository, SubscriberRepository};
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use storefront_common::models::{OrderRecord, SubscriberRecord};
use storefront_common::BoxFuture;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct MemoryOrderRepository {
    orders: Mutex<HashMap<String, OrderRecord>>,
    upserts: Mutex<usize>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.orders).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of upsert calls received, including ones that updated.
    pub fn upsert_count(&self) -> usize {
        *lock(&self.upserts)
    }

    pub fn all(&self) -> Vec<OrderRecord> {
        lock(&self.orders).values().cloned().collect()
    }

    fn upsert(&self, mut order: OrderRecord) {
        let mut orders = lock(&self.orders);
        match orders.get(&order.stripe_session_id) {
            Some(existing) => {
                order.id = existing.id.clone();
                order.created_at = existing.created_at;
            }
            None => order.id = Some(ObjectId::new().to_hex()),
        }
        orders.insert(order.stripe_session_id.clone(), order);
        *lock(&self.upserts) += 1;
    }
}

impl OrderRepository for MemoryOrderRepository {
    fn find_by_session_id(&self, session_id: &str) -> BoxFuture<'_, Option<OrderRecord>, DbError> {
        let found = lock(&self.orders).get(session_id).cloned();
        Box::pin(async move { Ok(found) })
    }

    fn upsert_by_session_id(&self, order: OrderRecord) -> BoxFuture<'_, (), DbError> {
        self.upsert(order);
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Default)]
pub struct MemorySubscriberRepository {
    subscribers: Mutex<HashMap<String, SubscriberRecord>>,
}

impl MemorySubscriberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.subscribers).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn all(&self) -> Vec<SubscriberRecord> {
        lock(&self.subscribers).values().cloned().collect()
    }

    fn upsert(&self, mut subscriber: SubscriberRecord) {
        let mut subscribers = lock(&self.subscribers);
        subscriber.id = match subscribers.get(&subscriber.email) {
            Some(existing) => existing.id.clone(),
            None => Some(ObjectId::new().to_hex()),
        };
        subscribers.insert(subscriber.email.clone(), subscriber);
    }
}

impl SubscriberRepository for MemorySubscriberRepository {
    fn find_by_email(&self, email: &str) -> BoxFuture<'_, Option<SubscriberRecord>, DbError> {
        let found = lock(&self.subscribers).get(email).cloned();
        Box::pin(async move { Ok(found) })
    }

    fn upsert_by_email(&self, subscriber: SubscriberRecord) -> BoxFuture<'_, (), DbError> {
        self.upsert(subscriber);
        Box::pin(async { Ok(()) })
    }
}
