//! MongoDB-backed subscriber repository

use crate::client::{DbClient, SUBSCRIBERS_COLLECTION};
use crate::documents::{from_document, to_document};
use crate::error::DbError;
use crate::repository::SubscriberRepository;
use mongodb::bson::{doc, Document};
use mongodb::options::UpdateOptions;
use mongodb::Collection;
use storefront_common::models::SubscriberRecord;
use storefront_common::BoxFuture;
use tracing::debug;

pub(crate) const SUBSCRIBER_DATE_FIELDS: &[&str] = &["currentPeriodEnd", "updatedAt"];

/// Subscribers stored in the `subscribers` collection, unique on `email`.
#[derive(Debug, Clone)]
pub struct MongoSubscriberRepository {
    db: DbClient,
    collection: Collection<Document>,
}

impl MongoSubscriberRepository {
    pub fn new(db: &DbClient) -> Self {
        Self {
            db: db.clone(),
            collection: db.collection(SUBSCRIBERS_COLLECTION),
        }
    }
}

impl SubscriberRepository for MongoSubscriberRepository {
    fn find_by_email(&self, email: &str) -> BoxFuture<'_, Option<SubscriberRecord>, DbError> {
        let filter = doc! { "email": email };
        Box::pin(async move {
            self.collection
                .find_one(filter, None)
                .await?
                .map(|document| from_document(document, SUBSCRIBER_DATE_FIELDS))
                .transpose()
        })
    }

    fn upsert_by_email(&self, subscriber: SubscriberRecord) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            let filter = doc! { "email": &subscriber.email };
            let set = to_document(&subscriber, SUBSCRIBER_DATE_FIELDS)?;
            let options = UpdateOptions::builder().upsert(true).build();
            // the upsert is only race free once the unique index exists
            self.db.ensure_indexes_once().await?;

            let result = self
                .collection
                .update_one(filter, doc! { "$set": set }, options)
                .await?;
            debug!(
                email = %subscriber.email,
                status = %subscriber.status,
                matched = result.matched_count,
                inserted = result.upserted_id.is_some(),
                "Subscriber upserted"
            );
            Ok(())
        })
    }
}
