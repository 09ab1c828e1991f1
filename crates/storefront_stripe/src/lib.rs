//! Stripe checkout, order lookup, membership and webhook handling.
//!
//! [`routes`] mounts the HTTP surface; the handlers depend only on the
//! [`StripeApi`] and repository traits held in [`StorefrontState`].

pub mod checkout;
#[cfg(test)]
mod checkout_proptest;
#[cfg(test)]
mod checkout_test;
pub mod client;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod members;
pub mod models;
pub mod orders;
pub mod routes;
pub mod webhook;
#[cfg(test)]
mod webhook_test;

pub use checkout::{CreateCheckoutSessionRequest, CreateCheckoutSessionResponse};
pub use client::{HttpStripeClient, StripeApi};
pub use error::StripeError;
pub use handlers::StorefrontState;
pub use routes::routes;
