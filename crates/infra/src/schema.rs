//! Database schema definitions.
//!
//! Both statements are idempotent. Column widths and the `DECIMAL(10,2)` scale
//! match the limits exported by `stockbook-inventory`.

/// SQL to create the inventory table.
pub const CREATE_INVENTORY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS inventory (
    id SERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    category VARCHAR(50) NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity >= 0),
    price DECIMAL(10,2) NOT NULL CHECK (price >= 0),
    date_added TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the ledger table.
///
/// No foreign key to `inventory`: entries must outlive deleted items.
pub const CREATE_LEDGER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS ledger (
    id SERIAL PRIMARY KEY,
    operation_type VARCHAR(10) NOT NULL CHECK (operation_type IN ('INSERT', 'UPDATE', 'DELETE')),
    item_name VARCHAR(100) NOT NULL,
    category VARCHAR(50),
    previous_quantity INTEGER,
    new_quantity INTEGER,
    previous_price DECIMAL(10,2),
    new_price DECIMAL(10,2),
    timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_inventory::{MAX_CATEGORY_LEN, MAX_NAME_LEN, PRICE_PRECISION, PRICE_SCALE};
    use stockbook_ledger::OperationType;

    #[test]
    fn column_limits_match_domain_constants() {
        let name = format!("VARCHAR({MAX_NAME_LEN})");
        let category = format!("VARCHAR({MAX_CATEGORY_LEN})");
        let price = format!("DECIMAL({PRICE_PRECISION},{PRICE_SCALE})");
        for sql in [CREATE_INVENTORY_TABLE, CREATE_LEDGER_TABLE] {
            assert!(sql.contains(&name));
            assert!(sql.contains(&category));
            assert!(sql.contains(&price));
            assert!(sql.contains("IF NOT EXISTS"));
        }
    }

    #[test]
    fn ledger_check_lists_every_operation_type() {
        for op in OperationType::ALL {
            assert!(CREATE_LEDGER_TABLE.contains(&format!("'{}'", op.as_str())));
        }
    }
}
