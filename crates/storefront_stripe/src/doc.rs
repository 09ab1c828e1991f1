#![cfg(feature = "openapi")]
use crate::checkout::{CreateCheckoutSessionRequest, CreateCheckoutSessionResponse};
use crate::handlers;
use crate::members::MemberStatus;
use crate::orders::{OrderLookup, OrderSource, SessionEmail};
use storefront_common::models::{
    Address, OrderCustomer, OrderItem, OrderItemPrice, OrderRecord, OrderShipping, SubscriberRecord,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_checkout_session_handler,
        handlers::get_order_handler,
        handlers::get_session_email_handler,
        handlers::member_status_handler,
        handlers::stripe_webhook_handler,
    ),
    components(
        schemas(
            CreateCheckoutSessionRequest, CreateCheckoutSessionResponse,
            OrderLookup, OrderSource, SessionEmail, MemberStatus,
            OrderRecord, OrderCustomer, OrderShipping, Address, OrderItem, OrderItemPrice,
            SubscriberRecord,
        )
    ),
    tags(
        (name = "Checkout", description = "Stripe Checkout Session creation"),
        (name = "Orders", description = "Post-checkout order and session lookups"),
        (name = "Members", description = "Membership status"),
        (name = "Stripe Webhooks", description = "Stripe server-to-server webhooks")
    )
)]
pub struct StorefrontApiDoc;
