//! Status-string data-access contract.
//!
//! Front ends call these functions with plain business parameters and get
//! back either rows or a human-readable status. Nothing here returns an
//! error: reads degrade to an empty list (and log), writes return a message.
//! Callers compare against the success constants below; any other string is
//! a failure.

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use stockbook_core::{DomainError, ItemId};
use stockbook_inventory::{InventoryItem, ItemDetails};
use stockbook_ledger::LedgerEntry;

use crate::store::{InventoryStore, StoreError};

pub const ITEM_ADDED: &str = "Item added successfully!";
pub const ITEM_UPDATED: &str = "Item updated successfully!";
pub const ITEM_DELETED: &str = "Item deleted successfully!";
pub const TABLES_CREATED: &str = "Tables created successfully!";

/// Whether a status string is one of the success literals.
pub fn is_success(status: &str) -> bool {
    matches!(
        status,
        ITEM_ADDED | ITEM_UPDATED | ITEM_DELETED | TABLES_CREATED
    )
}

/// Inventory operations with the ledger convention applied by the store.
#[derive(Debug, Clone)]
pub struct InventoryService<S> {
    store: S,
}

impl<S> InventoryService<S>
where
    S: InventoryStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All items ordered by id; empty on any storage error.
    pub async fn fetch_inventory(&self) -> Vec<InventoryItem> {
        match self.store.list_items().await {
            Ok(items) => items,
            Err(err) => {
                error!("Error fetching inventory: {err}");
                Vec::new()
            }
        }
    }

    /// All ledger entries in append order; empty on any storage error.
    pub async fn fetch_ledger(&self) -> Vec<LedgerEntry> {
        match self.store.list_ledger().await {
            Ok(entries) => entries,
            Err(err) => {
                error!("Error fetching ledger: {err}");
                Vec::new()
            }
        }
    }

    pub async fn add_inventory_item(
        &self,
        name: &str,
        category: &str,
        quantity: i32,
        price: Decimal,
    ) -> String {
        let details = ItemDetails::new(name, category, quantity, price);
        match self.store.add_item(details).await {
            Ok(recorded) => {
                info!(
                    item_id = %recorded.value.id,
                    ledger_entry_id = %recorded.entry.id,
                    name,
                    "item added"
                );
                ITEM_ADDED.to_string()
            }
            Err(StoreError::Domain(rejection)) => {
                warn!(name, reason = rejection.message(), "add rejected");
                rejection.message().to_string()
            }
            Err(err) => {
                error!(name, "Error adding item: {err}");
                format!("Error adding item: {err}")
            }
        }
    }

    /// Overwrites the item's fields and records the transition.
    ///
    /// An id with no row still succeeds: the ledger gets an UPDATE entry with a
    /// zero baseline and the update itself matches nothing. This is logged as a
    /// warning because it most likely indicates a stale selection.
    pub async fn update_inventory_item(
        &self,
        item_id: ItemId,
        name: &str,
        category: &str,
        quantity: i32,
        price: Decimal,
    ) -> String {
        let details = ItemDetails::new(name, category, quantity, price);
        match self.store.update_item(item_id, details).await {
            Ok(recorded) => {
                if recorded.value.is_none() {
                    warn!(
                        item_id = %item_id,
                        ledger_entry_id = %recorded.entry.id,
                        "update targeted a missing item; recorded with zero baseline"
                    );
                } else {
                    info!(item_id = %item_id, ledger_entry_id = %recorded.entry.id, "item updated");
                }
                ITEM_UPDATED.to_string()
            }
            Err(err) => {
                error!(item_id = %item_id, "Error updating item: {err}");
                format!("Error updating item: {}", describe(&err))
            }
        }
    }

    pub async fn delete_inventory_item(&self, item_id: ItemId) -> String {
        match self.store.delete_item(item_id).await {
            Ok(recorded) => {
                info!(
                    item_id = %item_id,
                    ledger_entry_id = %recorded.entry.id,
                    name = %recorded.value.name,
                    "item deleted"
                );
                ITEM_DELETED.to_string()
            }
            Err(StoreError::Domain(DomainError::NotFound(msg))) => {
                warn!(item_id = %item_id, "delete rejected: {msg}");
                format!("Error: {msg}")
            }
            Err(err) => {
                error!(item_id = %item_id, "Error deleting item: {err}");
                format!("Error deleting item: {}", describe(&err))
            }
        }
    }

    /// Idempotent schema creation.
    pub async fn create_tables(&self) -> String {
        match self.store.create_tables().await {
            Ok(()) => {
                info!("{TABLES_CREATED}");
                TABLES_CREATED.to_string()
            }
            Err(err) => {
                error!("Error: {err}");
                format!("Error: {}", describe(&err))
            }
        }
    }
}

fn describe(err: &StoreError) -> String {
    match err {
        StoreError::Domain(rejection) => rejection.message().to_string(),
        other => other.to_string(),
    }
}
