//! Inventory domain module.
//!
//! This crate contains the inventory record types and the rules applied to
//! them before they reach storage, implemented purely as deterministic domain
//! logic (no IO, no storage).

pub mod form;
pub mod item;

pub use form::{INVALID_FORM, ItemForm};
pub use item::{
    InventoryItem, ItemDetails, MAX_CATEGORY_LEN, MAX_NAME_LEN, PRICE_PRECISION, PRICE_SCALE,
    duplicate_name, missing_item,
};
