//! Line item models.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::normalize;

/// Billing category of a line item.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Doctor's consultation fee (the only senior-discountable category)
    Consultation,
    /// Laboratory tests
    Laboratory,
    /// Dispensed medicine
    Medicine,
    /// Procedures
    Procedure,
    /// Anything else
    #[default]
    Other,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Consultation => "consultation",
            ItemType::Laboratory => "laboratory",
            ItemType::Medicine => "medicine",
            ItemType::Procedure => "procedure",
            ItemType::Other => "other",
        }
    }

    /// Parse a category name. Unknown names fall back to `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "consultation" => ItemType::Consultation,
            "laboratory" | "lab" => ItemType::Laboratory,
            "medicine" => ItemType::Medicine,
            "procedure" => ItemType::Procedure,
            _ => ItemType::Other,
        }
    }
}

impl<'de> Deserialize<'de> for ItemType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.as_str().map(ItemType::parse).unwrap_or_default())
    }
}

/// A single billable line on a transaction.
///
/// `total_price` is derived from `quantity × unit_price` and is only ever
/// changed through the constructors and setters, which recompute it.
/// Deserialized records keep whatever total they were stored with, since
/// older records may carry a drifted value; call [`LineItem::recalculated`]
/// to restore the invariant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    #[serde(default = "new_item_id", deserialize_with = "normalize::de::text")]
    item_id: String,
    #[serde(default, deserialize_with = "normalize::de::text")]
    description: String,
    #[serde(default)]
    item_type: ItemType,
    #[serde(default, deserialize_with = "normalize::de::quantity")]
    quantity: u32,
    #[serde(default, deserialize_with = "normalize::de::money")]
    unit_price: Decimal,
    #[serde(default, deserialize_with = "normalize::de::money")]
    total_price: Decimal,
}

fn new_item_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl LineItem {
    /// Create a new line item. A negative unit price is clamped to zero.
    pub fn new(
        description: impl Into<String>,
        item_type: ItemType,
        quantity: u32,
        unit_price: Decimal,
    ) -> Self {
        let unit_price = normalize::clamp_money(unit_price);
        Self {
            item_id: new_item_id(),
            description: description.into(),
            item_type,
            quantity,
            unit_price,
            total_price: compute_total(quantity, unit_price),
        }
    }

    /// Create a line item from loosely typed form input.
    pub fn from_input(description: &str, item_type: &str, quantity: f64, unit_price: f64) -> Self {
        Self::new(
            description,
            ItemType::parse(item_type),
            normalize::quantity_from_f64(quantity),
            normalize::money_from_f64(unit_price),
        )
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    pub fn is_consultation(&self) -> bool {
        self.item_type == ItemType::Consultation
    }

    /// Change the quantity and recompute the total.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.total_price = compute_total(self.quantity, self.unit_price);
    }

    /// Change the unit price and recompute the total.
    pub fn set_unit_price(&mut self, unit_price: Decimal) {
        self.unit_price = normalize::clamp_money(unit_price);
        self.total_price = compute_total(self.quantity, self.unit_price);
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_item_type(&mut self, item_type: ItemType) {
        self.item_type = item_type;
    }

    /// Check that the stored total matches `quantity × unit_price`.
    pub fn is_consistent(&self) -> bool {
        self.total_price == compute_total(self.quantity, self.unit_price)
    }

    /// Return a copy with the total recomputed from quantity and unit price.
    pub fn recalculated(&self) -> Self {
        let mut item = self.clone();
        item.total_price = compute_total(item.quantity, item.unit_price);
        item
    }
}

fn compute_total(quantity: u32, unit_price: Decimal) -> Decimal {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .unwrap_or(Decimal::MAX)
}

/// Partial update for an existing line item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemUpdate {
    pub description: Option<String>,
    pub item_type: Option<ItemType>,
    pub quantity: Option<u32>,
    pub unit_price: Option<Decimal>,
}

impl LineItemUpdate {
    /// Apply to an item; totals are recomputed by the setters.
    pub fn apply(self, item: &mut LineItem) {
        if let Some(description) = self.description {
            item.set_description(description);
        }
        if let Some(item_type) = self.item_type {
            item.set_item_type(item_type);
        }
        if let Some(quantity) = self.quantity {
            item.set_quantity(quantity);
        }
        if let Some(unit_price) = self.unit_price {
            item.set_unit_price(unit_price);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_new_item_computes_total() {
        let item = LineItem::new("CBC", ItemType::Laboratory, 3, dec("150.25"));
        assert_eq!(item.total_price(), dec("450.75"));
        assert!(item.is_consistent());
        assert_eq!(item.item_id().len(), 36);
    }

    #[test]
    fn test_setters_recompute_total() {
        let mut item = LineItem::new("Paracetamol", ItemType::Medicine, 2, dec("10"));
        item.set_quantity(5);
        assert_eq!(item.total_price(), dec("50"));

        item.set_unit_price(dec("12.50"));
        assert_eq!(item.total_price(), dec("62.50"));
        assert!(item.is_consistent());
    }

    #[test]
    fn test_negative_unit_price_clamped() {
        let item = LineItem::new("Refund?", ItemType::Other, 1, dec("-20"));
        assert_eq!(item.unit_price(), Decimal::ZERO);
        assert_eq!(item.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_from_input_normalizes() {
        let item = LineItem::from_input("Consult", "Consultation", 1.7, f64::NAN);
        assert_eq!(item.item_type(), ItemType::Consultation);
        assert_eq!(item.quantity(), 1);
        assert_eq!(item.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_item_type_parse() {
        assert_eq!(ItemType::parse("consultation"), ItemType::Consultation);
        assert_eq!(ItemType::parse(" LAB "), ItemType::Laboratory);
        assert_eq!(ItemType::parse("x-ray"), ItemType::Other);
    }

    #[test]
    fn test_deserialize_loose_record() {
        let json = r#"{
            "item_id": "legacy-1",
            "description": null,
            "item_type": "procedure",
            "quantity": "2",
            "unit_price": "75.5",
            "total_price": "not a number"
        }"#;
        let item: LineItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.item_id(), "legacy-1");
        assert_eq!(item.description(), "");
        assert_eq!(item.item_type(), ItemType::Procedure);
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.unit_price(), dec("75.5"));
        assert_eq!(item.total_price(), Decimal::ZERO);
        assert!(!item.is_consistent());
        assert_eq!(item.recalculated().total_price(), dec("151.0"));
    }

    #[test]
    fn test_deserialize_missing_fields() {
        let item: LineItem = serde_json::from_str(r#"{"item_type": 7}"#).unwrap();
        assert_eq!(item.item_type(), ItemType::Other);
        assert_eq!(item.quantity(), 0);
        assert_eq!(item.total_price(), Decimal::ZERO);
        assert!(!item.item_id().is_empty());
    }

    #[test]
    fn test_update_applies_and_recomputes() {
        let mut item = LineItem::new("X-ray", ItemType::Other, 1, dec("500"));
        LineItemUpdate {
            item_type: Some(ItemType::Procedure),
            quantity: Some(2),
            ..Default::default()
        }
        .apply(&mut item);

        assert_eq!(item.item_type(), ItemType::Procedure);
        assert_eq!(item.total_price(), dec("1000"));
    }

    #[test]
    fn test_serialize_round_trip() {
        let item = LineItem::new("Consult", ItemType::Consultation, 1, dec("300"));
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"consultation\""));
        let back: LineItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
