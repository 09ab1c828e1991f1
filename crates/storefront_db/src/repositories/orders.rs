//! MongoDB-backed order repository

use crate::client::{DbClient, ORDERS_COLLECTION};
use crate::documents::{from_document, to_document};
use crate::error::DbError;
use crate::repository::OrderRepository;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::UpdateOptions;
use mongodb::Collection;
use storefront_common::models::OrderRecord;
use storefront_common::BoxFuture;
use tracing::debug;

pub(crate) const ORDER_DATE_FIELDS: &[&str] = &["stripe_created", "createdAt", "updatedAt"];

/// Orders stored in the `orders` collection, unique on `stripeSessionId`.
#[derive(Debug, Clone)]
pub struct MongoOrderRepository {
    db: DbClient,
    collection: Collection<Document>,
}

impl MongoOrderRepository {
    pub fn new(db: &DbClient) -> Self {
        Self {
            db: db.clone(),
            collection: db.collection(ORDERS_COLLECTION),
        }
    }
}

/// Builds the `$set` / `$setOnInsert` update for an order.
pub(crate) fn order_upsert_update(order: &OrderRecord) -> Result<Document, DbError> {
    let mut set = to_document(order, ORDER_DATE_FIELDS)?;
    // createdAt must not appear in both operators or the server rejects the update
    let created_at = set.remove("createdAt").unwrap_or(Bson::Null);
    Ok(doc! {
        "$set": set,
        "$setOnInsert": { "createdAt": created_at },
    })
}

impl OrderRepository for MongoOrderRepository {
    fn find_by_session_id(&self, session_id: &str) -> BoxFuture<'_, Option<OrderRecord>, DbError> {
        let filter = doc! { "stripeSessionId": session_id };
        Box::pin(async move {
            self.collection
                .find_one(filter, None)
                .await?
                .map(|document| from_document(document, ORDER_DATE_FIELDS))
                .transpose()
        })
    }

    fn upsert_by_session_id(&self, order: OrderRecord) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            let filter = doc! { "stripeSessionId": &order.stripe_session_id };
            let update = order_upsert_update(&order)?;
            let options = UpdateOptions::builder().upsert(true).build();
            // the upsert is only race free once the unique index exists
            self.db.ensure_indexes_once().await?;

            let result = self.collection.update_one(filter, update, options).await?;
            debug!(
                session_id = %order.stripe_session_id,
                matched = result.matched_count,
                inserted = result.upserted_id.is_some(),
                "Order upserted"
            );
            Ok(())
        })
    }
}
