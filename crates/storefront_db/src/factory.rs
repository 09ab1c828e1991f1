//! Factory for the repository set handed to the HTTP layer

use crate::client::DbClient;
use crate::repositories::{MongoOrderRepository, MongoSubscriberRepository};
use crate::repository::{OrderRepository, SubscriberRepository};
use std::sync::Arc;
use tracing::debug;

/// Both repositories, as trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub orders: Arc<dyn OrderRepository>,
    pub subscribers: Arc<dyn SubscriberRepository>,
}

impl Repositories {
    /// MongoDB repositories sharing the client's connection pool.
    pub fn mongo(db: &DbClient) -> Self {
        debug!(database = db.database().name(), "Creating MongoDB repositories");
        Self {
            orders: Arc::new(MongoOrderRepository::new(db)),
            subscribers: Arc::new(MongoSubscriberRepository::new(db)),
        }
    }

    /// Fresh, empty in-memory repositories.
    #[cfg(any(test, feature = "memory"))]
    pub fn memory() -> Self {
        use crate::repositories::{MemoryOrderRepository, MemorySubscriberRepository};

        debug!("Creating in-memory repositories");
        Self {
            orders: Arc::new(MemoryOrderRepository::new()),
            subscribers: Arc::new(MemorySubscriberRepository::new()),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
