//! Database integration for the storefront
//!
//! Orders and subscribers live in MongoDB. Handlers depend on the
//! [`OrderRepository`] and [`SubscriberRepository`] traits only; the hosting
//! process builds one [`DbClient`] and hands [`Repositories`] to the routes.
//!
//! # Features
//!
//! - `memory`: in-memory repositories with the same upsert semantics
//!
//! # Example
//!
//! ```rust,no_run
//! use storefront_config::AppConfig;
//! use storefront_db::{DbClient, Repositories};
//!
//! async fn setup(config: &AppConfig) -> Result<Repositories, storefront_db::error::DbError> {
//!     let db = DbClient::from_config(&config.database).await?;
//!     db.ensure_indexes().await?;
//!     Ok(Repositories::mongo(&db))
//! }
//! ```

pub mod client;
pub mod documents;
pub mod error;
pub mod factory;
pub mod repositories;
pub mod repository;

pub use client::DbClient;
pub use error::DbError;
pub use factory::Repositories;
pub use repository::{OrderRepository, SubscriberRepository};
