use thiserror::Error;

use stockbook_core::{DomainError, ItemId};
use stockbook_inventory::{InventoryItem, ItemDetails};
use stockbook_ledger::LedgerEntry;

/// The result of a mutation together with the ledger entry written in the
/// same transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded<T> {
    pub value: T,
    pub entry: LedgerEntry,
}

impl<T> Recorded<T> {
    pub fn new(value: T, entry: LedgerEntry) -> Self {
        Self { value, entry }
    }
}

/// Store operation error.
///
/// ## Error Categories
///
/// - **Domain**: a business rule rejected the call (duplicate name, non-positive
///   value on create, missing row on delete). Nothing was written.
/// - **Connection**: the store could not be reached or the connection failed.
/// - **Constraint**: the store refused a value (check violation, out-of-range
///   numeric, over-long text). The transaction was rolled back.
/// - **Database**: any other storage failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("{0}")]
    Database(String),
}

/// Transactional inventory + ledger store.
///
/// ## Ledger Convention
///
/// Every successful `add_item`, `update_item` and `delete_item` appends exactly
/// one ledger entry, built by `NewLedgerEntry`, inside the same unit of work as
/// the inventory write. Either both rows are written or neither is.
///
/// ## Connection Scope
///
/// Implementations acquire whatever they need per call and release it on every
/// exit path; no state is shared between calls except the tables themselves.
#[async_trait::async_trait]
pub trait InventoryStore: Send + Sync {
    /// Create both tables if they do not exist. Idempotent.
    async fn create_tables(&self) -> Result<(), StoreError>;

    /// All inventory rows, ordered by id.
    async fn list_items(&self) -> Result<Vec<InventoryItem>, StoreError>;

    /// All ledger entries, ordered by id (i.e. append order).
    async fn list_ledger(&self) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Insert a new item.
    ///
    /// Checks, in order: no item has exactly this name, then the creation
    /// rules of `ItemDetails::validate_for_insert`.
    async fn add_item(&self, details: ItemDetails) -> Result<Recorded<InventoryItem>, StoreError>;

    /// Overwrite an item's business fields.
    ///
    /// Returns the row as it was before the update. When no row has this id the
    /// entry is still written with a zero baseline, the update matches nothing,
    /// and the returned value is `None`.
    async fn update_item(
        &self,
        id: ItemId,
        details: ItemDetails,
    ) -> Result<Recorded<Option<InventoryItem>>, StoreError>;

    /// Remove an item, returning the row that was deleted.
    async fn delete_item(&self, id: ItemId) -> Result<Recorded<InventoryItem>, StoreError>;
}

#[async_trait::async_trait]
impl<S> InventoryStore for std::sync::Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn create_tables(&self) -> Result<(), StoreError> {
        (**self).create_tables().await
    }

    async fn list_items(&self) -> Result<Vec<InventoryItem>, StoreError> {
        (**self).list_items().await
    }

    async fn list_ledger(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        (**self).list_ledger().await
    }

    async fn add_item(&self, details: ItemDetails) -> Result<Recorded<InventoryItem>, StoreError> {
        (**self).add_item(details).await
    }

    async fn update_item(
        &self,
        id: ItemId,
        details: ItemDetails,
    ) -> Result<Recorded<Option<InventoryItem>>, StoreError> {
        (**self).update_item(id, details).await
    }

    async fn delete_item(&self, id: ItemId) -> Result<Recorded<InventoryItem>, StoreError> {
        (**self).delete_item(id).await
    }
}
