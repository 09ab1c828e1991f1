#[cfg(test)]
mod tests {
    use crate::checkout::{
        build_checkout_params, normalize_customer_email, normalize_item, CheckoutKind, CheckoutLine,
        CreateCheckoutSessionRequest,
    };
    use crate::error::StripeError;
    use serde_json::json;
    use storefront_common::models::CartLineItem;
    use storefront_config::StoreConfig;

    fn request(body: serde_json::Value) -> CreateCheckoutSessionRequest {
        serde_json::from_value(body).unwrap()
    }

    fn field<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_payment_example_single_tie() {
        let store = StoreConfig::default();
        let req = request(json!({"kind": "payment", "items": [{"name": "Tie", "unitAmount": 2900, "qty": 2}]}));

        let params = build_checkout_params(&req, &store, None).unwrap();

        assert_eq!(params.mode, CheckoutKind::Payment);
        assert_eq!(params.line_items.len(), 1);
        assert_eq!(
            params.line_items[0],
            CheckoutLine::Custom {
                name: "Tie".to_string(),
                sku: String::new(),
                currency: "usd".to_string(),
                unit_amount: 2900,
                quantity: 2,
            }
        );
        assert_eq!(params.line_items[0].amount(), Some(5800));
        assert_eq!(params.metadata.get("items_count").map(String::as_str), Some("1"));
        assert_eq!(params.metadata.get("kind").map(String::as_str), Some("payment"));
        assert!(params.metadata.get("plan").is_none());
    }

    #[test]
    fn test_payment_adds_shipping_options() {
        let store = StoreConfig::default();
        let req = request(json!({"kind": "payment", "items": [{"name": "Tie", "unitAmount": 2900}]}));

        let params = build_checkout_params(&req, &store, None).unwrap();
        let shipping = params.shipping.as_ref().unwrap();
        assert_eq!(shipping.allowed_countries, vec!["US"]);
        assert_eq!(shipping.rates.len(), 2);
        assert_eq!(shipping.rates[0].amount, 995);
        assert_eq!((shipping.rates[0].min_business_days, shipping.rates[0].max_business_days), (3, 5));
        assert_eq!(shipping.rates[1].amount, 1995);
        assert_eq!((shipping.rates[1].min_business_days, shipping.rates[1].max_business_days), (1, 2));

        let form = params.to_form();
        assert_eq!(field(&form, "shipping_address_collection[allowed_countries][0]"), Some("US"));
        assert_eq!(
            field(&form, "shipping_options[1][shipping_rate_data][fixed_amount][amount]"),
            Some("1995")
        );
        assert_eq!(
            field(&form, "shipping_options[0][shipping_rate_data][delivery_estimate][maximum][value]"),
            Some("5")
        );
        assert_eq!(field(&form, "line_items[0][price_data][unit_amount]"), Some("2900"));
        assert_eq!(field(&form, "line_items[0][quantity]"), Some("1"));
    }

    #[test]
    fn test_item_defaults_and_coercion() {
        let line = normalize_item(&json!({"qty": "3", "unitAmount": "1250", "sku": 42}), "usd").unwrap();
        assert_eq!(
            line,
            CheckoutLine::Custom {
                name: "Item".to_string(),
                sku: "42".to_string(),
                currency: "usd".to_string(),
                unit_amount: 1250,
                quantity: 3,
            }
        );

        // zero and empty values are falsy and fall back to the default quantity
        let line = normalize_item(&json!({"name": "  ", "qty": 0, "unitAmount": 100}), "usd").unwrap();
        assert_eq!(line.quantity(), 1);

        let line = normalize_item(&json!({"name": "Belt", "qty": 2.6, "unitAmount": 2999.5}), "usd").unwrap();
        assert_eq!(line.quantity(), 3);
        assert_eq!(line.amount(), Some(3000 * 3));
    }

    #[test]
    fn test_item_rejects_bad_amounts() {
        for item in [
            json!({"name": "Sock", "unitAmount": 49}),
            json!({"name": "Sock"}),
            json!({"name": "Sock", "unitAmount": "cheap"}),
            json!({"name": "Sock", "unitAmount": -500}),
        ] {
            let err = normalize_item(&item, "usd").unwrap_err();
            assert!(matches!(err, StripeError::ValidationError(ref m) if m.contains("unitAmount")), "{item}");
        }

        for item in [
            json!({"name": "Sock", "unitAmount": 500, "qty": 0.5}),
            json!({"name": "Sock", "unitAmount": 500, "qty": "many"}),
            json!({"name": "Sock", "unitAmount": 500, "qty": -2}),
            json!({"name": "Sock", "unitAmount": 500, "qty": "0"}),
        ] {
            let err = normalize_item(&item, "usd").unwrap_err();
            assert!(matches!(err, StripeError::ValidationError(ref m) if m.contains("qty")), "{item}");
        }
    }

    #[test]
    fn test_payment_requires_items() {
        let store = StoreConfig::default();
        for body in [
            json!({"kind": "payment"}),
            json!({"kind": "payment", "items": []}),
            json!({"kind": "payment", "items": {"name": "Tie"}}),
        ] {
            let err = build_checkout_params(&request(body), &store, Some("price_123")).unwrap_err();
            assert!(matches!(err, StripeError::ValidationError(ref m) if m.starts_with("Missing items")));
        }
    }

    #[test]
    fn test_one_bad_item_rejects_whole_request() {
        let store = StoreConfig::default();
        let req = request(json!({"kind": "payment", "items": [
            {"name": "Tie", "unitAmount": 2900},
            {"name": "Pin", "unitAmount": 10}
        ]}));

        assert!(matches!(
            build_checkout_params(&req, &store, None),
            Err(StripeError::ValidationError(_))
        ));
    }

    #[test]
    fn test_subscription_is_default_kind() {
        let store = StoreConfig::default();
        let params = build_checkout_params(&request(json!({})), &store, Some("price_member")).unwrap();

        assert_eq!(params.mode, CheckoutKind::Subscription);
        assert_eq!(
            params.line_items,
            vec![CheckoutLine::Price {
                price_id: "price_member".to_string(),
                quantity: 1,
            }]
        );
        assert!(params.shipping.is_none());
        assert_eq!(params.metadata.get("plan").map(String::as_str), Some("membership"));
        assert_eq!(params.metadata.get("site").map(String::as_str), Some("hmenfashion.com"));

        let form = params.to_form();
        assert_eq!(field(&form, "mode"), Some("subscription"));
        assert_eq!(field(&form, "line_items[0][price]"), Some("price_member"));
        assert_eq!(field(&form, "phone_number_collection[enabled]"), Some("true"));
        assert_eq!(field(&form, "billing_address_collection"), Some("required"));
        assert_eq!(field(&form, "payment_method_types[0]"), Some("card"));
        assert_eq!(
            field(&form, "success_url"),
            Some("https://hmenfashion.com/success.html?session_id={CHECKOUT_SESSION_ID}")
        );
        assert_eq!(field(&form, "cancel_url"), Some("https://hmenfashion.com/cancel.html"));
    }

    #[test]
    fn test_subscription_without_price_is_config_error() {
        let store = StoreConfig::default();
        for price in [None, Some(""), Some("   ")] {
            let err = build_checkout_params(&request(json!({"kind": "subscription"})), &store, price).unwrap_err();
            assert!(matches!(err, StripeError::ConfigError(ref m) if m == "Missing STRIPE_SUBSCRIPTION_PRICE_ID in env."));
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let store = StoreConfig::default();
        let err = build_checkout_params(&request(json!({"kind": "rental"})), &store, Some("price_1")).unwrap_err();
        assert!(matches!(err, StripeError::ValidationError(_)));
    }

    #[test]
    fn test_customer_email_normalisation() {
        assert_eq!(
            normalize_customer_email(Some(&json!("  Ada@Example.COM "))),
            Some("ada@example.com".to_string())
        );
        assert_eq!(normalize_customer_email(Some(&json!("not-an-email"))), None);
        assert_eq!(normalize_customer_email(Some(&json!(42))), None);
        assert_eq!(normalize_customer_email(None), None);

        let store = StoreConfig::default();
        let req = request(json!({"customerEmail": "Ada@Example.com"}));
        let params = build_checkout_params(&req, &store, Some("price_1")).unwrap();
        let form = params.to_form();
        assert_eq!(field(&form, "customer_email"), Some("ada@example.com"));
        assert_eq!(field(&form, "metadata[email]"), Some("ada@example.com"));

        let params = build_checkout_params(&request(json!({})), &store, Some("price_1")).unwrap();
        let form = params.to_form();
        assert_eq!(field(&form, "customer_email"), None);
        assert_eq!(field(&form, "metadata[email]"), Some(""));
    }

    #[test]
    fn test_cart_payload_is_accepted_as_is() {
        let line = CartLineItem::new("tie-navy", "Navy Silk Tie", 29.0, 2).with_size("One Size");
        let payload = serde_json::to_value(line.to_checkout_item()).unwrap();

        let checkout_line = normalize_item(&payload, "usd").unwrap();
        assert_eq!(checkout_line.amount(), Some(line.line_total()));
        assert_eq!(
            checkout_line,
            CheckoutLine::Custom {
                name: "Navy Silk Tie".to_string(),
                sku: "tie-navy".to_string(),
                currency: "usd".to_string(),
                unit_amount: 2900,
                quantity: 2,
            }
        );
    }
}
