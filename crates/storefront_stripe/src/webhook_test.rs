#[cfg(test)]
mod tests {
    use crate::error::{StripeError, MISSING_SECRET_KEY};
    use crate::models::StripeEvent;
    use crate::webhook::{construct_event, process_event, sign_payload, verify_signature, WebhookOutcome};
    use chrono::Utc;
    use serde_json::json;
    use storefront_common::{HttpStatusCode, StorefrontError};

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_700_000_000;
    const TOLERANCE: i64 = 300;

    fn payload() -> Vec<u8> {
        json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "created": NOW,
            "data": {"object": {"id": "cs_test_1", "customer_details": {"email": "Ada@Example.com"}}}
        })
        .to_string()
        .into_bytes()
    }

    fn event(event_type: &str, object: serde_json::Value) -> StripeEvent {
        serde_json::from_value(json!({"id": "evt_1", "type": event_type, "data": {"object": object}})).unwrap()
    }

    fn signature_message(result: Result<(), StripeError>) -> String {
        match result {
            Err(StripeError::WebhookSignatureError(message)) => message,
            other => panic!("expected signature error, got {:?}", other),
        }
    }

    #[test]
    fn test_signed_payload_verifies() {
        let body = payload();
        let header = sign_payload(&body, SECRET, NOW).unwrap();
        assert!(header.starts_with(&format!("t={},v1=", NOW)));
        assert!(verify_signature(&body, Some(&header), SECRET, TOLERANCE, NOW + 10).is_ok());
    }

    #[test]
    fn test_any_matching_v1_is_accepted() {
        let body = payload();
        let good = sign_payload(&body, SECRET, NOW).unwrap();
        let good_sig = good.split("v1=").nth(1).unwrap();
        let header = format!("t={},v1={},v0=legacy,v1={}", NOW, "ab".repeat(32), good_sig);

        assert!(verify_signature(&body, Some(&header), SECRET, TOLERANCE, NOW).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let body = payload();
        let header = sign_payload(&body, SECRET, NOW).unwrap();
        let mut tampered = body.clone();
        tampered.extend_from_slice(b" ");

        assert_eq!(
            signature_message(verify_signature(&tampered, Some(&header), SECRET, TOLERANCE, NOW)),
            "No signatures found matching the expected signature for payload."
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let body = payload();
        let header = sign_payload(&body, "whsec_other", NOW).unwrap();
        assert!(verify_signature(&body, Some(&header), SECRET, TOLERANCE, NOW).is_err());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let body = payload();
        let header = sign_payload(&body, SECRET, NOW).unwrap();

        assert_eq!(
            signature_message(verify_signature(&body, Some(&header), SECRET, TOLERANCE, NOW + TOLERANCE + 1)),
            "Timestamp outside the tolerance zone"
        );
        // non-positive tolerance disables the age check
        assert!(verify_signature(&body, Some(&header), SECRET, 0, NOW + 86_400).is_ok());
    }

    #[test]
    fn test_extreme_signed_timestamp_is_stale() {
        let body = payload();
        let header = sign_payload(&body, SECRET, i64::MIN).unwrap();

        assert_eq!(
            signature_message(verify_signature(&body, Some(&header), SECRET, TOLERANCE, NOW)),
            "Timestamp outside the tolerance zone"
        );
    }

    #[test]
    fn test_malformed_headers_rejected() {
        let body = payload();

        assert_eq!(
            signature_message(verify_signature(&body, None, SECRET, TOLERANCE, NOW)),
            "No stripe-signature header value was provided."
        );
        assert_eq!(
            signature_message(verify_signature(&body, Some("  "), SECRET, TOLERANCE, NOW)),
            "No stripe-signature header value was provided."
        );
        assert_eq!(
            signature_message(verify_signature(&body, Some("v1=abc"), SECRET, TOLERANCE, NOW)),
            "Unable to extract timestamp and signatures from header"
        );
        assert_eq!(
            signature_message(verify_signature(&body, Some("t=soon,v1=abc"), SECRET, TOLERANCE, NOW)),
            "Unable to extract timestamp and signatures from header"
        );
        assert_eq!(
            signature_message(verify_signature(&body, Some(&format!("t={}", NOW)), SECRET, TOLERANCE, NOW)),
            "No signatures found with expected scheme"
        );
        assert_eq!(
            signature_message(verify_signature(
                &body,
                Some(&format!("t={},v1=not-hex", NOW)),
                SECRET,
                TOLERANCE,
                NOW
            )),
            "No signatures found matching the expected signature for payload."
        );
    }

    #[test]
    fn test_construct_event_parses_verified_payload() {
        let body = payload();
        let header = sign_payload(&body, SECRET, NOW).unwrap();

        let event = construct_event(&body, Some(&header), Some(SECRET), TOLERANCE, NOW).unwrap();
        assert_eq!(event.id, "evt_1");
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.created, NOW);
    }

    #[test]
    fn test_construct_event_failures_are_client_errors() {
        let body = payload();
        let header = sign_payload(&body, SECRET, NOW).unwrap();

        for secret in [None, Some(""), Some(" ")] {
            let err = construct_event(&body, Some(&header), secret, TOLERANCE, NOW).unwrap_err();
            assert!(matches!(err, StripeError::WebhookSignatureError(ref m) if m == "Missing STRIPE_WEBHOOK_SECRET in env."));
        }

        let not_an_event = b"{\"hello\":\"world\"}".to_vec();
        let header = sign_payload(&not_an_event, SECRET, NOW).unwrap();
        let err = construct_event(&not_an_event, Some(&header), Some(SECRET), TOLERANCE, NOW).unwrap_err();
        assert!(err.to_string().starts_with("Invalid webhook payload"));
        assert_eq!(err.status_code(), 400);
        assert!(matches!(StorefrontError::from(err), StorefrontError::SignatureError(_)));
    }

    #[tokio::test]
    async fn test_other_event_types_ignored() {
        let outcome = process_event(
            event("invoice.paid", json!({"id": "in_1"})),
            None,
            None,
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, WebhookOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_completed_without_email_writes_nothing() {
        let object = json!({"id": "cs_1", "customer_details": {"email": "  "}, "subscription": "sub_1"});
        let outcome = process_event(event("checkout.session.completed", object), None, None, Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::MissingEmail);
    }

    #[tokio::test]
    async fn test_completed_payment_without_subscription() {
        let object = json!({"id": "cs_1", "mode": "payment", "customer_details": {"email": "ada@example.com"}, "subscription": null});
        let outcome = process_event(event("checkout.session.completed", object), None, None, Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::NoSubscription);
    }

    #[tokio::test]
    async fn test_subscription_without_stripe_client_fails() {
        let object = json!({"id": "cs_1", "customer_details": {"email": "ada@example.com"}, "subscription": "sub_1"});
        let err = process_event(event("checkout.session.completed", object), None, None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StripeError::ConfigError(ref m) if m == MISSING_SECRET_KEY));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_unparseable_session_object_fails_processing() {
        let outcome = process_event(
            event("checkout.session.completed", json!({"customer_details": "nope"})),
            None,
            None,
            Utc::now(),
        )
        .await;
        assert!(matches!(outcome, Err(StripeError::WebhookProcessingError(_))));
    }
}
