use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{DomainError, DomainResult, Entity, ItemId};

/// Column width of `inventory.name` (and `ledger.item_name`).
pub const MAX_NAME_LEN: usize = 100;

/// Column width of `inventory.category` (and `ledger.category`).
pub const MAX_CATEGORY_LEN: usize = 50;

/// Fractional digits kept by `DECIMAL(10,2)` price columns.
pub const PRICE_SCALE: u32 = 2;

/// Total digits allowed by `DECIMAL(10,2)` price columns.
pub const PRICE_PRECISION: u32 = 10;

/// A stored inventory row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub price: Decimal,
    /// Set by storage on insert; never changed afterwards.
    pub date_added: NaiveDateTime,
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }
}

impl InventoryItem {
    /// The mutable part of this row, as an update would supply it.
    pub fn details(&self) -> ItemDetails {
        ItemDetails {
            name: self.name.clone(),
            category: self.category.clone(),
            quantity: self.quantity,
            price: self.price,
        }
    }
}

/// Business fields supplied by a caller for an add or an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl ItemDetails {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: i32,
        price: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            quantity,
            price,
        }
    }

    /// Creation rules: quantity is checked before price, both must be positive.
    ///
    /// Updates are not subject to these rules; only the storage constraints
    /// (non-negative values) apply to them.
    pub fn validate_for_insert(&self) -> DomainResult<()> {
        if self.quantity <= 0 {
            return Err(DomainError::validation("Quantity must be greater than 0!"));
        }
        if self.price <= Decimal::ZERO {
            return Err(DomainError::validation("Price must be greater than 0!"));
        }
        Ok(())
    }
}

/// Error returned when an add collides with an existing name.
pub fn duplicate_name() -> DomainError {
    DomainError::conflict("Item with this name already exists!")
}

/// Error returned when a delete targets an id with no row.
pub fn missing_item(id: ItemId) -> DomainError {
    DomainError::not_found(format!("Item with ID {id} does not exist."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn widget(quantity: i32, price: Decimal) -> ItemDetails {
        ItemDetails::new("Widget", "Tools", quantity, price)
    }

    #[test]
    fn positive_quantity_and_price_are_accepted() {
        assert!(widget(10, Decimal::new(550, 2)).validate_for_insert().is_ok());
    }

    #[test]
    fn zero_quantity_is_rejected_before_price() {
        let err = widget(0, Decimal::ZERO).validate_for_insert().unwrap_err();
        assert_eq!(err.message(), "Quantity must be greater than 0!");
    }

    #[test]
    fn zero_price_is_rejected() {
        let err = widget(3, Decimal::ZERO).validate_for_insert().unwrap_err();
        assert_eq!(err, DomainError::validation("Price must be greater than 0!"));
    }

    #[test]
    fn missing_item_mentions_id() {
        assert_eq!(
            missing_item(ItemId::new(7)).message(),
            "Item with ID 7 does not exist."
        );
    }

    #[test]
    fn details_copies_business_fields() {
        let item = InventoryItem {
            id: ItemId::new(1),
            name: "Widget".to_string(),
            category: "Tools".to_string(),
            quantity: 10,
            price: Decimal::new(550, 2),
            date_added: chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
        };
        assert_eq!(item.details(), widget(10, Decimal::new(550, 2)));
        assert_eq!(Entity::id(&item), ItemId::new(1));
    }

    proptest! {
        #[test]
        fn negative_quantity_never_validates(quantity in i32::MIN..=0, cents in 1i64..1_000_000) {
            let err = widget(quantity, Decimal::new(cents, 2)).validate_for_insert().unwrap_err();
            prop_assert_eq!(err.message(), "Quantity must be greater than 0!");
        }

        #[test]
        fn non_positive_price_never_validates(quantity in 1i32..10_000, cents in -1_000_000i64..=0) {
            let err = widget(quantity, Decimal::new(cents, 2)).validate_for_insert().unwrap_err();
            prop_assert_eq!(err.message(), "Price must be greater than 0!");
        }
    }
}
