//! Raw form input and its field-level validation.
//!
//! Front ends collect text; this module turns it into `ItemDetails` or the
//! single generic rejection message shown to the operator.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{DomainError, DomainResult};

use crate::item::ItemDetails;

/// Message shown for any field-level rejection.
pub const INVALID_FORM: &str = "Please enter valid values!";

/// Unparsed item fields as typed by an operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemForm {
    pub name: String,
    pub category: String,
    pub quantity: String,
    pub price: String,
}

impl ItemForm {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            quantity: quantity.into(),
            price: price.into(),
        }
    }

    /// Trim and check every field.
    ///
    /// Quantity must be plain digits and price digits with at most one
    /// decimal point; signs, exponents and whitespace inside a field are
    /// rejected. Zero passes here and is left to the creation rules.
    pub fn parse(&self) -> DomainResult<ItemDetails> {
        let name = self.name.trim();
        let category = self.category.trim();
        if name.is_empty() || category.is_empty() {
            return Err(invalid());
        }

        let quantity = parse_quantity(self.quantity.trim()).ok_or_else(invalid)?;
        let price = parse_price(self.price.trim()).ok_or_else(invalid)?;

        Ok(ItemDetails::new(name, category, quantity, price))
    }
}

fn invalid() -> DomainError {
    DomainError::validation(INVALID_FORM)
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_quantity(raw: &str) -> Option<i32> {
    if raw.is_empty() || !all_digits(raw) {
        return None;
    }
    raw.parse::<i32>().ok()
}

fn parse_price(raw: &str) -> Option<Decimal> {
    let (whole, fraction) = match raw.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (raw, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !all_digits(whole) || !all_digits(fraction) {
        return None;
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    };
    Decimal::from_str(&normalized).ok()
}
