//! Postgres-backed inventory + ledger store.
//!
//! ## Connection Scope
//!
//! Every operation opens its own `PgConnection` from the configured URL (there
//! is no pool), runs inside one explicit transaction, commits, and closes the
//! connection. On any early return the transaction is dropped (rolled back)
//! and the connection is dropped (closed), so nothing leaks on error paths.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (check violation) | `23514` | `Constraint` | Negative quantity/price, unknown operation type |
//! | Database (not-null violation) | `23502` | `Constraint` | Missing required column |
//! | Database (string data right truncation) | `22001` | `Constraint` | Name/category longer than the column |
//! | Database (numeric value out of range) | `22003` | `Constraint` | Price beyond `DECIMAL(10,2)` |
//! | Database (other) | Any other | `Database` | Missing tables, permissions, etc. |
//! | Io / Tls / Configuration / PoolTimedOut | N/A | `Connection` | Store unreachable or URL invalid |
//! | Other | N/A | `Database` | Decode failures, protocol errors |

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{Connection, FromRow, PgConnection, Postgres, Row, Transaction};
use tracing::{Span, instrument};

use stockbook_core::{ItemId, LedgerEntryId};
use stockbook_inventory::{InventoryItem, ItemDetails, duplicate_name, missing_item};
use stockbook_ledger::{LedgerEntry, NewLedgerEntry, OperationType};

use super::r#trait::{InventoryStore, Recorded, StoreError};
use crate::config::DatabaseConfig;
use crate::schema;

/// Postgres-backed inventory store.
///
/// Holds only the connection configuration; it is cheap to clone and safe to
/// share across threads.
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    config: DatabaseConfig,
}

impl PostgresInventoryStore {
    /// Create a store that connects with the given configuration on each call.
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    async fn connect(&self) -> Result<PgConnection, StoreError> {
        PgConnection::connect(self.config.url())
            .await
            .map_err(|e| map_sqlx_error("connect", e))
    }
}

/// Release a connection after a committed unit of work.
async fn close(conn: PgConnection) -> Result<(), StoreError> {
    conn.close().await.map_err(|e| map_sqlx_error("close", e))
}

async fn rollback(tx: Transaction<'_, Postgres>) -> Result<(), StoreError> {
    tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))
}

async fn find_item(
    tx: &mut Transaction<'_, Postgres>,
    id: ItemId,
) -> Result<Option<InventoryItem>, StoreError> {
    let row = sqlx::query(
        r#"
        SELECT id, name, category, quantity, price, date_added
        FROM inventory
        WHERE id = $1
        "#,
    )
    .bind(id.get())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("find_item", e))?;

    row.map(|row| decode::<ItemRow>(&row).map(InventoryItem::from))
        .transpose()
}

async fn append_entry(
    tx: &mut Transaction<'_, Postgres>,
    entry: NewLedgerEntry,
) -> Result<LedgerEntry, StoreError> {
    let row = sqlx::query(
        r#"
        INSERT INTO ledger (
            operation_type,
            item_name,
            category,
            previous_quantity,
            new_quantity,
            previous_price,
            new_price
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, operation_type, item_name, category,
                  previous_quantity, new_quantity, previous_price, new_price, timestamp
        "#,
    )
    .bind(entry.operation_type.as_str())
    .bind(&entry.item_name)
    .bind(&entry.category)
    .bind(entry.previous_quantity)
    .bind(entry.new_quantity)
    .bind(entry.previous_price)
    .bind(entry.new_price)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("append_ledger_entry", e))?;

    // RETURNING yields the stored values (prices already coerced to the column scale).
    decode::<LedgerRow>(&row)?.try_into()
}

#[async_trait::async_trait]
impl InventoryStore for PostgresInventoryStore {
    #[instrument(skip(self), err)]
    async fn create_tables(&self) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;
        let mut tx = conn
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for statement in [schema::CREATE_INVENTORY_TABLE, schema::CREATE_LEDGER_TABLE] {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("create_tables", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        close(conn).await
    }

    #[instrument(skip(self), fields(item_count = tracing::field::Empty), err)]
    async fn list_items(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let mut conn = self.connect().await?;

        let rows = sqlx::query(
            r#"
            SELECT id, name, category, quantity, price, date_added
            FROM inventory
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("list_items", e))?;

        let mut items: Vec<InventoryItem> = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(decode::<ItemRow>(&row)?.into());
        }

        Span::current().record("item_count", items.len());
        close(conn).await?;
        Ok(items)
    }

    #[instrument(skip(self), err)]
    async fn list_ledger(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        let mut conn = self.connect().await?;

        let rows = sqlx::query(
            r#"
            SELECT id, operation_type, item_name, category,
                   previous_quantity, new_quantity, previous_price, new_price, timestamp
            FROM ledger
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&mut conn)
        .await
        .map_err(|e| map_sqlx_error("list_ledger", e))?;

        let mut entries: Vec<LedgerEntry> = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(decode::<LedgerRow>(&row)?.try_into()?);
        }

        close(conn).await?;
        Ok(entries)
    }

    /// Duplicate check, creation rules, inventory insert, ledger insert, commit.
    #[instrument(skip(self, details), fields(name = %details.name), err)]
    async fn add_item(&self, details: ItemDetails) -> Result<Recorded<InventoryItem>, StoreError> {
        let mut conn = self.connect().await?;
        let mut tx = conn
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let count: i64 = sqlx::query("SELECT COUNT(*) AS total FROM inventory WHERE name = $1")
            .bind(&details.name)
            .fetch_one(&mut *tx)
            .await
            .and_then(|row| row.try_get("total"))
            .map_err(|e| map_sqlx_error("count_by_name", e))?;

        if count > 0 {
            rollback(tx).await?;
            return Err(duplicate_name().into());
        }
        if let Err(err) = details.validate_for_insert() {
            rollback(tx).await?;
            return Err(err.into());
        }

        let row = sqlx::query(
            r#"
            INSERT INTO inventory (name, category, quantity, price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, category, quantity, price, date_added
            "#,
        )
        .bind(&details.name)
        .bind(&details.category)
        .bind(details.quantity)
        .bind(details.price)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_item", e))?;
        let item: InventoryItem = decode::<ItemRow>(&row)?.into();

        let entry = append_entry(&mut tx, NewLedgerEntry::insert(&item.details())).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        close(conn).await?;

        Ok(Recorded::new(item, entry))
    }

    #[instrument(skip(self, details), fields(item_id = %id, name = %details.name), err)]
    async fn update_item(
        &self,
        id: ItemId,
        details: ItemDetails,
    ) -> Result<Recorded<Option<InventoryItem>>, StoreError> {
        let mut conn = self.connect().await?;
        let mut tx = conn
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let previous = find_item(&mut tx, id).await?;
        let entry = append_entry(&mut tx, NewLedgerEntry::update(previous.as_ref(), &details)).await?;

        sqlx::query(
            r#"
            UPDATE inventory
            SET name = $1, category = $2, quantity = $3, price = $4
            WHERE id = $5
            "#,
        )
        .bind(&details.name)
        .bind(&details.category)
        .bind(details.quantity)
        .bind(details.price)
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_item", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        close(conn).await?;

        Ok(Recorded::new(previous, entry))
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn delete_item(&self, id: ItemId) -> Result<Recorded<InventoryItem>, StoreError> {
        let mut conn = self.connect().await?;
        let mut tx = conn
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let Some(item) = find_item(&mut tx, id).await? else {
            rollback(tx).await?;
            return Err(missing_item(id).into());
        };

        let entry = append_entry(&mut tx, NewLedgerEntry::delete(&item)).await?;

        sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_item", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        close(conn).await?;

        Ok(Recorded::new(item, entry))
    }
}

/// Map SQLx errors to store errors.
///
/// See the module-level documentation for the mapping table.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23514") | Some("23502") | Some("22001") | Some("22003") => {
                    StoreError::Constraint(msg)
                }
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::Io(e) => {
            StoreError::Connection(format!("io error in {}: {}", operation, e))
        }
        sqlx::Error::Tls(e) => {
            StoreError::Connection(format!("tls error in {}: {}", operation, e))
        }
        sqlx::Error::Configuration(e) => {
            StoreError::Connection(format!("invalid configuration in {}: {}", operation, e))
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Connection(format!("connection unavailable in {}", operation))
        }
        sqlx::Error::RowNotFound => {
            // Lookups use fetch_optional; fetch_one is only used with RETURNING.
            StoreError::Database(format!("unexpected row not found in {}", operation))
        }
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn decode<'r, T>(row: &'r PgRow) -> Result<T, StoreError>
where
    T: FromRow<'r, PgRow>,
{
    T::from_row(row).map_err(|e| StoreError::Database(format!("failed to decode row: {}", e)))
}

// SQLx row types

#[derive(Debug)]
struct ItemRow {
    id: i32,
    name: String,
    category: String,
    quantity: i32,
    price: Decimal,
    date_added: NaiveDateTime,
}

impl<'r> FromRow<'r, PgRow> for ItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ItemRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            quantity: row.try_get("quantity")?,
            price: row.try_get("price")?,
            date_added: row.try_get("date_added")?,
        })
    }
}

impl From<ItemRow> for InventoryItem {
    fn from(row: ItemRow) -> Self {
        InventoryItem {
            id: ItemId::new(row.id),
            name: row.name,
            category: row.category,
            quantity: row.quantity,
            price: row.price,
            date_added: row.date_added,
        }
    }
}

#[derive(Debug)]
struct LedgerRow {
    id: i32,
    operation_type: String,
    item_name: String,
    category: Option<String>,
    previous_quantity: Option<i32>,
    new_quantity: Option<i32>,
    previous_price: Option<Decimal>,
    new_price: Option<Decimal>,
    timestamp: NaiveDateTime,
}

impl<'r> FromRow<'r, PgRow> for LedgerRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(LedgerRow {
            id: row.try_get("id")?,
            operation_type: row.try_get("operation_type")?,
            item_name: row.try_get("item_name")?,
            category: row.try_get("category")?,
            previous_quantity: row.try_get("previous_quantity")?,
            new_quantity: row.try_get("new_quantity")?,
            previous_price: row.try_get("previous_price")?,
            new_price: row.try_get("new_price")?,
            timestamp: row.try_get("timestamp")?,
        })
    }
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = StoreError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        let operation_type: OperationType = row.operation_type.parse()?;
        Ok(LedgerEntry {
            id: LedgerEntryId::new(row.id),
            operation_type,
            item_name: row.item_name,
            category: row.category,
            previous_quantity: row.previous_quantity,
            new_quantity: row.new_quantity,
            previous_price: row.previous_price,
            new_price: row.new_price,
            timestamp: row.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_connection_errors() {
        let err = map_sqlx_error(
            "connect",
            sqlx::Error::Configuration("bad url".into()),
        );
        assert!(matches!(err, StoreError::Connection(msg) if msg.contains("connect")));
    }

    #[test]
    fn row_not_found_is_a_database_error() {
        let err = map_sqlx_error("find_item", sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(msg) if msg.contains("find_item")));
    }

    #[test]
    fn unknown_operation_type_fails_decoding() {
        let row = LedgerRow {
            id: 1,
            operation_type: "UPSERT".to_string(),
            item_name: "Widget".to_string(),
            category: None,
            previous_quantity: None,
            new_quantity: None,
            previous_price: None,
            new_price: None,
            timestamp: chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
        };
        let err = LedgerEntry::try_from(row).unwrap_err();
        assert!(matches!(err, StoreError::Domain(_)));
    }

    #[test]
    fn store_is_constructed_from_config() {
        let store = PostgresInventoryStore::new(DatabaseConfig::new("postgres://localhost/stock"));
        assert_eq!(store.config().url(), "postgres://localhost/stock");
    }
}
