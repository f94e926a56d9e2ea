use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{DomainError, Entity, LedgerEntryId};
use stockbook_inventory::{InventoryItem, ItemDetails};

/// Kind of inventory mutation an entry records.
///
/// Stored as the upper-case SQL literal (`INSERT`, `UPDATE`, `DELETE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationType {
    Insert,
    Update,
    Delete,
}

impl OperationType {
    pub const ALL: [OperationType; 3] = [
        OperationType::Insert,
        OperationType::Update,
        OperationType::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Insert => "INSERT",
            OperationType::Update => "UPDATE",
            OperationType::Delete => "DELETE",
        }
    }
}

impl core::fmt::Display for OperationType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OperationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(OperationType::Insert),
            "UPDATE" => Ok(OperationType::Update),
            "DELETE" => Ok(OperationType::Delete),
            other => Err(DomainError::validation(format!(
                "unknown operation_type '{other}'"
            ))),
        }
    }
}

/// A stored, immutable audit row.
///
/// Entries are denormalized snapshots: nothing links them back to an
/// inventory row, so they outlive the items they describe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub operation_type: OperationType,
    pub item_name: String,
    pub category: Option<String>,
    pub previous_quantity: Option<i32>,
    pub new_quantity: Option<i32>,
    pub previous_price: Option<Decimal>,
    pub new_price: Option<Decimal>,
    pub timestamp: NaiveDateTime,
}

impl Entity for LedgerEntry {
    type Id = LedgerEntryId;

    fn id(&self) -> LedgerEntryId {
        self.id
    }
}

/// An audit row ready to be appended (id and timestamp not yet assigned).
///
/// The constructors encode which snapshot each mutation records:
///
/// | operation | item_name / category | previous      | new           |
/// |-----------|----------------------|---------------|---------------|
/// | insert    | supplied             | null          | supplied      |
/// | update    | supplied             | stored row, or 0 when absent | supplied |
/// | delete    | stored row           | stored row    | 0             |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    pub operation_type: OperationType,
    pub item_name: String,
    pub category: Option<String>,
    pub previous_quantity: Option<i32>,
    pub new_quantity: Option<i32>,
    pub previous_price: Option<Decimal>,
    pub new_price: Option<Decimal>,
}

impl NewLedgerEntry {
    pub fn insert(details: &ItemDetails) -> Self {
        Self {
            operation_type: OperationType::Insert,
            item_name: details.name.clone(),
            category: Some(details.category.clone()),
            previous_quantity: None,
            new_quantity: Some(details.quantity),
            previous_price: None,
            new_price: Some(details.price),
        }
    }

    /// `previous` is the row found by id before the update, if any.
    ///
    /// A missing row is recorded as a transition from a zero baseline.
    pub fn update(previous: Option<&InventoryItem>, details: &ItemDetails) -> Self {
        let (previous_quantity, previous_price) = match previous {
            Some(item) => (item.quantity, item.price),
            None => (0, Decimal::ZERO),
        };
        Self {
            operation_type: OperationType::Update,
            item_name: details.name.clone(),
            category: Some(details.category.clone()),
            previous_quantity: Some(previous_quantity),
            new_quantity: Some(details.quantity),
            previous_price: Some(previous_price),
            new_price: Some(details.price),
        }
    }

    pub fn delete(item: &InventoryItem) -> Self {
        Self {
            operation_type: OperationType::Delete,
            item_name: item.name.clone(),
            category: Some(item.category.clone()),
            previous_quantity: Some(item.quantity),
            new_quantity: Some(0),
            previous_price: Some(item.price),
            new_price: Some(Decimal::ZERO),
        }
    }

    /// Attach the storage-assigned identity.
    pub fn into_entry(self, id: LedgerEntryId, timestamp: NaiveDateTime) -> LedgerEntry {
        LedgerEntry {
            id,
            operation_type: self.operation_type,
            item_name: self.item_name,
            category: self.category,
            previous_quantity: self.previous_quantity,
            new_quantity: self.new_quantity,
            previous_price: self.previous_price,
            new_price: self.new_price,
            timestamp,
        }
    }
}
