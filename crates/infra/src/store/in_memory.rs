use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{NaiveDateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use stockbook_core::{ItemId, LedgerEntryId};
use stockbook_inventory::{
    InventoryItem, ItemDetails, MAX_CATEGORY_LEN, MAX_NAME_LEN, PRICE_PRECISION, PRICE_SCALE,
    duplicate_name, missing_item,
};
use stockbook_ledger::{LedgerEntry, NewLedgerEntry};

use super::r#trait::{InventoryStore, Recorded, StoreError};

#[derive(Debug, Default)]
struct Tables {
    items: BTreeMap<ItemId, InventoryItem>,
    ledger: Vec<LedgerEntry>,
    last_item_id: i32,
    last_entry_id: i32,
}

impl Tables {
    fn next_item_id(&mut self) -> ItemId {
        self.last_item_id += 1;
        ItemId::new(self.last_item_id)
    }

    fn append(&mut self, entry: NewLedgerEntry, timestamp: NaiveDateTime) -> LedgerEntry {
        self.last_entry_id += 1;
        let stored = entry.into_entry(LedgerEntryId::new(self.last_entry_id), timestamp);
        self.ledger.push(stored.clone());
        stored
    }
}

/// In-memory inventory + ledger tables.
///
/// Intended for tests/dev. Mirrors the SQL schema closely enough that the same
/// calls succeed or fail as they would against Postgres:
///
/// - tables must be created before use,
/// - ids are generated starting at 1,
/// - prices are rounded to `DECIMAL(10,2)` and range-checked,
/// - check constraints and column widths are enforced.
///
/// Every call runs under one write lock and validates everything before it
/// mutates anything, so a rejected call leaves both tables untouched.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    tables: RwLock<Option<Tables>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tables<R>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut guard = self
            .tables
            .write()
            .map_err(|_| StoreError::Database("lock poisoned".to_string()))?;
        let tables = guard.as_mut().ok_or_else(|| {
            StoreError::Database("relation \"inventory\" does not exist".to_string())
        })?;
        f(tables)
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Coerce a price the way a `DECIMAL(10,2)` column does.
fn column_price(price: Decimal) -> Result<Decimal, StoreError> {
    let mut rounded =
        price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(PRICE_SCALE);
    let limit = Decimal::from(10i64.pow(PRICE_PRECISION - PRICE_SCALE));
    if rounded.abs() >= limit {
        return Err(StoreError::Constraint("numeric field overflow".to_string()));
    }
    Ok(rounded)
}

fn check_text(value: &str, max: usize) -> Result<(), StoreError> {
    if value.chars().count() > max {
        return Err(StoreError::Constraint(format!(
            "value too long for type character varying({max})"
        )));
    }
    Ok(())
}

/// Apply the `ledger` column rules (widths and `DECIMAL(10,2)`, no sign checks).
fn ledger_row(details: ItemDetails) -> Result<ItemDetails, StoreError> {
    check_text(&details.name, MAX_NAME_LEN)?;
    check_text(&details.category, MAX_CATEGORY_LEN)?;
    let price = column_price(details.price)?;
    Ok(ItemDetails { price, ..details })
}

/// Apply the `inventory` column rules to the supplied fields, returning them
/// as they would be stored.
fn inventory_row(details: ItemDetails) -> Result<ItemDetails, StoreError> {
    let details = ledger_row(details)?;
    let price = details.price;
    if details.quantity < 0 {
        return Err(StoreError::Constraint(
            "new row for relation \"inventory\" violates check constraint \"inventory_quantity_check\""
                .to_string(),
        ));
    }
    if price < Decimal::ZERO {
        return Err(StoreError::Constraint(
            "new row for relation \"inventory\" violates check constraint \"inventory_price_check\""
                .to_string(),
        ));
    }
    Ok(ItemDetails { price, ..details })
}

#[async_trait::async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn create_tables(&self) -> Result<(), StoreError> {
        let mut guard = self
            .tables
            .write()
            .map_err(|_| StoreError::Database("lock poisoned".to_string()))?;
        guard.get_or_insert_with(Tables::default);
        Ok(())
    }

    async fn list_items(&self) -> Result<Vec<InventoryItem>, StoreError> {
        self.with_tables(|tables| Ok(tables.items.values().cloned().collect()))
    }

    async fn list_ledger(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        self.with_tables(|tables| Ok(tables.ledger.clone()))
    }

    async fn add_item(&self, details: ItemDetails) -> Result<Recorded<InventoryItem>, StoreError> {
        self.with_tables(|tables| {
            if tables.items.values().any(|item| item.name == details.name) {
                return Err(duplicate_name().into());
            }
            details.validate_for_insert()?;
            let details = inventory_row(details)?;

            let timestamp = now();
            let item = InventoryItem {
                id: tables.next_item_id(),
                name: details.name.clone(),
                category: details.category.clone(),
                quantity: details.quantity,
                price: details.price,
                date_added: timestamp,
            };
            tables.items.insert(item.id, item.clone());
            let entry = tables.append(NewLedgerEntry::insert(&details), timestamp);

            Ok(Recorded::new(item, entry))
        })
    }

    async fn update_item(
        &self,
        id: ItemId,
        details: ItemDetails,
    ) -> Result<Recorded<Option<InventoryItem>>, StoreError> {
        self.with_tables(|tables| {
            let previous = tables.items.get(&id).cloned();
            // A missing row means the UPDATE matches nothing, so only the
            // ledger columns constrain the values.
            let details = match previous {
                Some(_) => inventory_row(details)?,
                None => ledger_row(details)?,
            };

            let entry = tables.append(NewLedgerEntry::update(previous.as_ref(), &details), now());
            if let Some(item) = tables.items.get_mut(&id) {
                item.name = details.name;
                item.category = details.category;
                item.quantity = details.quantity;
                item.price = details.price;
            }

            Ok(Recorded::new(previous, entry))
        })
    }

    async fn delete_item(&self, id: ItemId) -> Result<Recorded<InventoryItem>, StoreError> {
        self.with_tables(|tables| {
            let item = tables
                .items
                .get(&id)
                .cloned()
                .ok_or_else(|| missing_item(id))?;

            let entry = tables.append(NewLedgerEntry::delete(&item), now());
            tables.items.remove(&id);

            Ok(Recorded::new(item, entry))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_core::DomainError;
    use stockbook_ledger::OperationType;

    fn widget(quantity: i32, price: Decimal) -> ItemDetails {
        ItemDetails::new("Widget", "Tools", quantity, price)
    }

    async fn ready_store() -> InMemoryInventoryStore {
        let store = InMemoryInventoryStore::new();
        store.create_tables().await.unwrap();
        store
    }

    #[tokio::test]
    async fn reads_fail_before_tables_exist() {
        let store = InMemoryInventoryStore::new();
        let err = store.list_items().await.unwrap_err();
        assert!(matches!(err, StoreError::Database(msg) if msg.contains("does not exist")));
    }

    #[tokio::test]
    async fn create_tables_is_idempotent() {
        let store = ready_store().await;
        store.add_item(widget(1, Decimal::ONE)).await.unwrap();
        store.create_tables().await.unwrap();
        assert_eq!(store.list_items().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn add_assigns_sequential_ids_and_records_insert() {
        let store = ready_store().await;
        let first = store.add_item(widget(10, Decimal::new(550, 2))).await.unwrap();
        let second = store
            .add_item(ItemDetails::new("Gadget", "Tools", 1, Decimal::ONE))
            .await
            .unwrap();

        assert_eq!(first.value.id, ItemId::new(1));
        assert_eq!(second.value.id, ItemId::new(2));
        assert_eq!(first.entry.operation_type, OperationType::Insert);
        assert_eq!(first.entry.id, LedgerEntryId::new(1));
        assert_eq!(first.entry.timestamp, first.value.date_added);
    }

    #[tokio::test]
    async fn price_is_rounded_like_decimal_10_2() {
        let store = ready_store().await;
        let added = store.add_item(widget(1, Decimal::new(12345, 3))).await.unwrap();
        assert_eq!(added.value.price, Decimal::new(1235, 2));
        assert_eq!(added.entry.new_price, Some(Decimal::new(1235, 2)));
    }

    #[tokio::test]
    async fn overflowing_price_is_a_constraint_error() {
        let store = ready_store().await;
        let err = store
            .add_item(widget(1, Decimal::new(100_000_000, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert!(store.list_ledger().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn long_name_is_rejected_without_writes() {
        let store = ready_store().await;
        let details = ItemDetails::new("x".repeat(MAX_NAME_LEN + 1), "Tools", 1, Decimal::ONE);
        let err = store.add_item(details).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(msg) if msg.contains("varying(100)")));
        assert!(store.list_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_name_is_checked_before_values() {
        let store = ready_store().await;
        store.add_item(widget(1, Decimal::ONE)).await.unwrap();
        let err = store.add_item(widget(0, Decimal::ZERO)).await.unwrap_err();
        match err {
            StoreError::Domain(DomainError::Conflict(msg)) => {
                assert_eq!(msg, "Item with this name already exists!")
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn name_match_is_case_sensitive() {
        let store = ready_store().await;
        store.add_item(widget(1, Decimal::ONE)).await.unwrap();
        store
            .add_item(ItemDetails::new("widget", "Tools", 1, Decimal::ONE))
            .await
            .unwrap();
        assert_eq!(store.list_items().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn negative_update_rolls_back_ledger_entry() {
        let store = ready_store().await;
        let added = store.add_item(widget(5, Decimal::ONE)).await.unwrap();

        let err = store
            .update_item(added.value.id, widget(-1, Decimal::ONE))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(msg) if msg.contains("quantity_check")));
        assert_eq!(store.list_ledger().await.unwrap().len(), 1);
        assert_eq!(store.list_items().await.unwrap()[0].quantity, 5);
    }

    #[tokio::test]
    async fn update_of_missing_row_records_zero_baseline() {
        let store = ready_store().await;
        let recorded = store
            .update_item(ItemId::new(99), widget(3, Decimal::new(250, 2)))
            .await
            .unwrap();

        assert_eq!(recorded.value, None);
        assert_eq!(recorded.entry.previous_quantity, Some(0));
        assert_eq!(recorded.entry.previous_price, Some(Decimal::ZERO));
        assert!(store.list_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_row_skips_inventory_checks() {
        let store = ready_store().await;
        let recorded = store
            .update_item(ItemId::new(99), ItemDetails::new("Ghost", "Misc", -5, Decimal::ONE))
            .await
            .unwrap();

        assert_eq!(recorded.value, None);
        assert_eq!(recorded.entry.new_quantity, Some(-5));
        assert_eq!(recorded.entry.new_price, Some(Decimal::new(100, 2)));
        assert_eq!(store.list_ledger().await.unwrap().len(), 1);
        assert!(store.list_items().await.unwrap().is_empty());

        let long_name = "x".repeat(MAX_NAME_LEN + 1);
        let err = store
            .update_item(ItemId::new(99), ItemDetails::new(long_name, "Misc", 1, Decimal::ONE))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert_eq!(store.list_ledger().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_keeps_date_added() {
        let store = ready_store().await;
        let added = store.add_item(widget(5, Decimal::ONE)).await.unwrap();
        store
            .update_item(added.value.id, ItemDetails::new("Renamed", "Misc", 0, Decimal::ZERO))
            .await
            .unwrap();

        let items = store.list_items().await.unwrap();
        assert_eq!(items[0].name, "Renamed");
        assert_eq!(items[0].quantity, 0);
        assert_eq!(items[0].date_added, added.value.date_added);
    }

    #[tokio::test]
    async fn delete_of_missing_row_writes_nothing() {
        let store = ready_store().await;
        let err = store.delete_item(ItemId::new(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::NotFound(_))));
        assert!(store.list_ledger().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ledger_survives_item_deletion() {
        let store = ready_store().await;
        let added = store.add_item(widget(2, Decimal::ONE)).await.unwrap();
        let deleted = store.delete_item(added.value.id).await.unwrap();

        assert_eq!(deleted.value, added.value);
        assert!(store.list_items().await.unwrap().is_empty());
        let ledger = store.list_ledger().await.unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[1].operation_type, OperationType::Delete);
    }
}
