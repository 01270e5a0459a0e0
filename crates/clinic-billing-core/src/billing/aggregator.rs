//! Line item aggregation.

use rust_decimal::Decimal;

use crate::models::LineItem;

/// Sum of `total_price` over all items. Empty input yields zero.
pub fn subtotal(items: &[LineItem]) -> Decimal {
    sum_totals(items.iter())
}

/// Sum of `total_price` over consultation items only.
pub fn consultation_subtotal(items: &[LineItem]) -> Decimal {
    sum_totals(items.iter().filter(|item| item.is_consultation()))
}

fn sum_totals<'a>(items: impl Iterator<Item = &'a LineItem>) -> Decimal {
    items.fold(Decimal::ZERO, |acc, item| {
        acc.checked_add(item.total_price()).unwrap_or(Decimal::MAX)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemType;

    #[test]
    fn test_empty_subtotal_is_zero() {
        assert_eq!(subtotal(&[]), Decimal::ZERO);
        assert_eq!(consultation_subtotal(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_subtotal_sums_totals() {
        let items = vec![
            LineItem::new("Consult", ItemType::Consultation, 1, Decimal::from(300)),
            LineItem::new("CBC", ItemType::Laboratory, 2, Decimal::from(250)),
            LineItem::new("Amoxicillin", ItemType::Medicine, 10, Decimal::new(1250, 2)),
        ];
        assert_eq!(subtotal(&items), Decimal::from(925));
        assert_eq!(consultation_subtotal(&items), Decimal::from(300));
    }

    #[test]
    fn test_malformed_stored_total_counts_as_zero() {
        let item: LineItem =
            serde_json::from_str(r#"{"item_type": "medicine", "total_price": "oops"}"#).unwrap();
        let items = vec![
            item,
            LineItem::new("Consult", ItemType::Consultation, 1, Decimal::from(100)),
        ];
        assert_eq!(subtotal(&items), Decimal::from(100));
    }
}
