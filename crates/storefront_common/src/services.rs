// --- File: crates/storefront_common/src/services.rs ---
//! Service abstractions shared across crates.
//!
//! Service traits return boxed futures so they stay dyn-compatible and can
//! be injected as `Arc<dyn Trait>` into handler state.

use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;
