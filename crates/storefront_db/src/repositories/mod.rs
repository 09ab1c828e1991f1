//! Repository implementations for database access
//!
//! MongoDB-backed repositories for orders and subscribers, plus in-memory
//! equivalents behind the `memory` feature.

#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod orders;
pub mod subscribers;

#[cfg(any(test, feature = "memory"))]
pub use memory::{MemoryOrderRepository, MemorySubscriberRepository};
pub use orders::MongoOrderRepository;
pub use subscribers::MongoSubscriberRepository;
