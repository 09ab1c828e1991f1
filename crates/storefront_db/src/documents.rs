//! Conversion between shared models and stored BSON documents.
//!
//! Models serialize timestamps as RFC 3339 strings and ids as hex strings.
//! In the database timestamps are native BSON dates and `_id` is an ObjectId,
//! so both directions patch those fields explicitly.

use crate::error::DbError;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, Bson, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializes `value` and turns the named RFC 3339 string fields into BSON dates.
///
/// `_id` is always dropped: the database assigns it.
pub fn to_document<T: Serialize>(value: &T, date_fields: &[&str]) -> Result<Document, DbError> {
    let mut document = bson::to_document(value)?;
    document.remove("_id");

    for field in date_fields {
        let parsed = match document.get(*field) {
            Some(Bson::String(text)) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        };
        if let Some(dt) = parsed {
            document.insert(*field, Bson::DateTime(bson::DateTime::from_millis(dt.timestamp_millis())));
        }
    }
    Ok(document)
}

/// Deserializes a stored document, rendering `_id` as hex and the named
/// BSON date fields as RFC 3339 strings first.
pub fn from_document<T: DeserializeOwned>(mut document: Document, date_fields: &[&str]) -> Result<T, DbError> {
    if let Ok(oid) = document.get_object_id("_id") {
        document.insert("_id", oid.to_hex());
    }

    for field in date_fields {
        let rendered = match document.get(*field) {
            Some(Bson::DateTime(dt)) => {
                DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis()).map(|dt| dt.to_rfc3339())
            }
            _ => None,
        };
        if let Some(text) = rendered {
            document.insert(*field, text);
        }
    }

    Ok(bson::from_document(document)?)
}
