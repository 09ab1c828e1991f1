//! Stripe REST client.
//!
//! Handlers talk to Stripe through the [`StripeApi`] trait so tests can
//! inject a fake. [`HttpStripeClient`] is the reqwest implementation: form
//! encoded requests, basic auth with the secret key, and a pinned API
//! version header.

use crate::checkout::CheckoutSessionParams;
use crate::error::{StripeError, MISSING_SECRET_KEY};
use crate::models::{CheckoutSession, CheckoutSessionCreated, LineItem, StripeList, Subscription};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use storefront_common::BoxFuture;
use storefront_config::StripeConfig;
use tracing::{debug, error};

/// The Stripe operations the storefront uses.
pub trait StripeApi: Send + Sync {
    fn create_checkout_session(
        &self,
        params: CheckoutSessionParams,
    ) -> BoxFuture<'_, CheckoutSessionCreated, StripeError>;

    /// Retrieves a session, expanding the named fields.
    fn retrieve_checkout_session(
        &self,
        session_id: &str,
        expand: &[&str],
    ) -> BoxFuture<'_, CheckoutSession, StripeError>;

    fn list_line_items(&self, session_id: &str, limit: u8) -> BoxFuture<'_, Vec<LineItem>, StripeError>;

    fn retrieve_subscription(&self, subscription_id: &str) -> BoxFuture<'_, Subscription, StripeError>;
}

/// Stripe client over a shared reqwest client.
#[derive(Clone)]
pub struct HttpStripeClient {
    http: Client,
    api_base: String,
    api_version: String,
    secret_key: String,
}

impl std::fmt::Debug for HttpStripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStripeClient")
            .field("api_base", &self.api_base)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl HttpStripeClient {
    /// Fails with a configuration error when no secret key is configured.
    pub fn from_config(http: Client, config: &StripeConfig) -> Result<Self, StripeError> {
        let secret_key = config
            .secret_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| StripeError::config(MISSING_SECRET_KEY))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            secret_key: secret_key.to_string(),
        })
    }

    /// `{api_base}/v1/{segments...}`, with each segment percent-encoded.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, StripeError> {
        let invalid = || StripeError::config(format!("Invalid Stripe API base URL: {}", self.api_base));
        let mut url = Url::parse(&self.api_base).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.secret_key, None::<&str>)
            .header("Stripe-Version", &self.api_version)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, StripeError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        let body_text = response.text().await?;

        if status.is_success() {
            debug!(status = %status, operation = what, "Stripe API request succeeded");
            return Ok(serde_json::from_str(&body_text)?);
        }

        let message = api_error_message(&body_text);
        error!(status = %status, operation = what, message = %message, "Stripe API request failed");
        Err(StripeError::ApiError {
            status_code: status.as_u16(),
            message,
        })
    }
}

/// Extracts `error.message` from a Stripe error body, falling back to the raw body.
pub fn api_error_message(body_text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body_text)
        .ok()
        .and_then(|body| {
            body.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body_text.to_string())
}

impl StripeApi for HttpStripeClient {
    fn create_checkout_session(
        &self,
        params: CheckoutSessionParams,
    ) -> BoxFuture<'_, CheckoutSessionCreated, StripeError> {
        Box::pin(async move {
            let url = self.url(&["checkout", "sessions"])?;
            let request = self.http.post(url).form(&params.to_form());
            self.send(request, "create_checkout_session").await
        })
    }

    fn retrieve_checkout_session(
        &self,
        session_id: &str,
        expand: &[&str],
    ) -> BoxFuture<'_, CheckoutSession, StripeError> {
        let session_id = session_id.to_string();
        let query: Vec<(&'static str, String)> =
            expand.iter().map(|field| ("expand[]", field.to_string())).collect();
        Box::pin(async move {
            let url = self.url(&["checkout", "sessions", &session_id])?;
            let request = self.http.get(url).query(&query);
            self.send(request, "retrieve_checkout_session").await
        })
    }

    fn list_line_items(&self, session_id: &str, limit: u8) -> BoxFuture<'_, Vec<LineItem>, StripeError> {
        let session_id = session_id.to_string();
        Box::pin(async move {
            let url = self.url(&["checkout", "sessions", &session_id, "line_items"])?;
            let request = self.http.get(url).query(&[("limit", limit.to_string())]);
            let list: StripeList<LineItem> = self.send(request, "list_line_items").await?;
            Ok(list.data)
        })
    }

    fn retrieve_subscription(&self, subscription_id: &str) -> BoxFuture<'_, Subscription, StripeError> {
        let subscription_id = subscription_id.to_string();
        Box::pin(async move {
            let url = self.url(&["subscriptions", &subscription_id])?;
            let request = self.http.get(url);
            self.send(request, "retrieve_subscription").await
        })
    }
}
