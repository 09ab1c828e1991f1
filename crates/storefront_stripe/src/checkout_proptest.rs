#[cfg(test)]
mod tests {
    use crate::checkout::{normalize_item, CheckoutLine, MIN_UNIT_AMOUNT};
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        // Every accepted item becomes an integer line with qty >= 1 and unit_amount >= 50
        #[test]
        fn test_accepted_items_are_valid_lines(
            qty in 1.0f64..500.0,
            unit_amount in 50.0f64..1_000_000.0,
            qty_as_string in any::<bool>(),
        ) {
            let qty_value = if qty_as_string { json!(qty.to_string()) } else { json!(qty) };
            let item = json!({"name": "Shirt", "qty": qty_value, "unitAmount": unit_amount});

            let line = normalize_item(&item, "usd").unwrap();
            match line {
                CheckoutLine::Custom { quantity, unit_amount: amount, .. } => {
                    prop_assert!(quantity >= 1);
                    prop_assert!(amount >= MIN_UNIT_AMOUNT as i64);
                    prop_assert_eq!(quantity, qty.round() as i64);
                    prop_assert_eq!(amount, unit_amount.round() as i64);
                }
                other => prop_assert!(false, "unexpected line {:?}", other),
            }
        }

        // Unit amounts below the minimum are always rejected
        #[test]
        fn test_small_unit_amounts_rejected(unit_amount in 0.01f64..49.99) {
            let item = json!({"name": "Shirt", "qty": 1, "unitAmount": unit_amount});
            prop_assert!(normalize_item(&item, "usd").is_err());
        }

        // Fractional quantities below one are always rejected
        #[test]
        fn test_fractional_quantities_rejected(qty in 0.01f64..0.99) {
            let item = json!({"name": "Shirt", "qty": qty, "unitAmount": 500});
            prop_assert!(normalize_item(&item, "usd").is_err());
        }
    }
}
