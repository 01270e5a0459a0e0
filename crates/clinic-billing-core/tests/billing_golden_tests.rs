//! Golden tests for the billing calculation model.
//!
//! Each case lists form input as the front-end sends it and the amounts the
//! summary panel and receipt must show.

use std::str::FromStr;

use clinic_billing_core::billing::summarize;
use clinic_billing_core::models::{DiscountConfig, LineItem};
use rust_decimal::Decimal;

/// Test case: (item type, quantity, unit price) rows plus discount input.
struct GoldenCase {
    id: &'static str,
    items: Vec<(&'static str, f64, f64)>,
    discount_amount: f64,
    discount_percentage: f64,
    is_senior_citizen: bool,
    senior_discount_percentage: f64,
    expected_subtotal: &'static str,
    expected_regular: &'static str,
    expected_senior: &'static str,
    expected_net: &'static str,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "percentage-only",
            items: vec![("laboratory", 1.0, 1000.0)],
            discount_amount: 0.0,
            discount_percentage: 10.0,
            is_senior_citizen: false,
            senior_discount_percentage: 20.0,
            expected_subtotal: "1000",
            expected_regular: "100",
            expected_senior: "0",
            expected_net: "900",
        },
        GoldenCase {
            id: "flat-plus-senior",
            items: vec![("consultation", 1.0, 300.0), ("laboratory", 1.0, 500.0)],
            discount_amount: 50.0,
            discount_percentage: 0.0,
            is_senior_citizen: true,
            senior_discount_percentage: 20.0,
            expected_subtotal: "800",
            expected_regular: "50",
            expected_senior: "60",
            expected_net: "690",
        },
        GoldenCase {
            id: "percentage-overrides-flat",
            items: vec![("medicine", 4.0, 25.0)],
            discount_amount: 30.0,
            discount_percentage: 5.0,
            is_senior_citizen: false,
            senior_discount_percentage: 20.0,
            expected_subtotal: "100",
            expected_regular: "5",
            expected_senior: "0",
            expected_net: "95",
        },
        GoldenCase {
            id: "senior-without-consultation",
            items: vec![("procedure", 1.0, 1500.0), ("medicine", 2.0, 120.0)],
            discount_amount: 0.0,
            discount_percentage: 0.0,
            is_senior_citizen: true,
            senior_discount_percentage: 20.0,
            expected_subtotal: "1740",
            expected_regular: "0",
            expected_senior: "0",
            expected_net: "1740",
        },
        GoldenCase {
            id: "senior-custom-percentage",
            items: vec![("consultation", 2.0, 250.0)],
            discount_amount: 0.0,
            discount_percentage: 0.0,
            is_senior_citizen: true,
            senior_discount_percentage: 12.0,
            expected_subtotal: "500",
            expected_regular: "0",
            expected_senior: "60",
            expected_net: "440",
        },
        GoldenCase {
            id: "percentage-and-senior-stack",
            items: vec![("consultation", 1.0, 500.0), ("laboratory", 1.0, 500.0)],
            discount_amount: 0.0,
            discount_percentage: 10.0,
            is_senior_citizen: true,
            senior_discount_percentage: 20.0,
            expected_subtotal: "1000",
            expected_regular: "100",
            expected_senior: "100",
            expected_net: "800",
        },
        GoldenCase {
            id: "over-discount-floors-at-zero",
            items: vec![("consultation", 1.0, 100.0)],
            discount_amount: 150.0,
            discount_percentage: 0.0,
            is_senior_citizen: true,
            senior_discount_percentage: 20.0,
            expected_subtotal: "100",
            expected_regular: "150",
            expected_senior: "20",
            expected_net: "0",
        },
        GoldenCase {
            id: "garbage-input-is-zero",
            items: vec![("consultation", f64::NAN, 300.0), ("xray", 1.0, f64::INFINITY)],
            discount_amount: -40.0,
            discount_percentage: f64::NAN,
            is_senior_citizen: true,
            senior_discount_percentage: 20.0,
            expected_subtotal: "0",
            expected_regular: "0",
            expected_senior: "0",
            expected_net: "0",
        },
        GoldenCase {
            id: "fractional-quantity-truncates",
            items: vec![("medicine", 2.9, 10.0)],
            discount_amount: 0.0,
            discount_percentage: 0.0,
            is_senior_citizen: false,
            senior_discount_percentage: 20.0,
            expected_subtotal: "20",
            expected_regular: "0",
            expected_senior: "0",
            expected_net: "20",
        },
        GoldenCase {
            id: "percentage-rounds-to-cents",
            items: vec![("laboratory", 1.0, 333.33)],
            discount_amount: 0.0,
            discount_percentage: 15.0,
            is_senior_citizen: false,
            senior_discount_percentage: 20.0,
            expected_subtotal: "333.33",
            expected_regular: "50.00",
            expected_senior: "0",
            expected_net: "283.33",
        },
        GoldenCase {
            id: "empty-transaction",
            items: vec![],
            discount_amount: 50.0,
            discount_percentage: 0.0,
            is_senior_citizen: true,
            senior_discount_percentage: 20.0,
            expected_subtotal: "0",
            expected_regular: "50",
            expected_senior: "0",
            expected_net: "0",
        },
    ]
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn test_golden_cases() {
    for case in get_golden_cases() {
        let items: Vec<LineItem> = case
            .items
            .iter()
            .map(|(item_type, quantity, unit_price)| {
                LineItem::from_input("line", item_type, *quantity, *unit_price)
            })
            .collect();
        let discount = DiscountConfig::from_input(
            case.discount_amount,
            case.discount_percentage,
            case.is_senior_citizen,
            case.senior_discount_percentage,
        );

        let summary = summarize(&items, &discount);

        assert_eq!(
            summary.subtotal,
            dec(case.expected_subtotal),
            "Case {}: subtotal mismatch",
            case.id
        );
        assert_eq!(
            summary.regular_discount,
            dec(case.expected_regular),
            "Case {}: regular discount mismatch",
            case.id
        );
        assert_eq!(
            summary.senior_discount,
            dec(case.expected_senior),
            "Case {}: senior discount mismatch",
            case.id
        );
        assert_eq!(
            summary.net_total,
            dec(case.expected_net),
            "Case {}: net total mismatch",
            case.id
        );
    }
}
