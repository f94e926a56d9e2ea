use chrono::NaiveDateTime;
use tabled::{Table, Tabled, settings::Style};

use stockbook_inventory::InventoryItem;
use stockbook_ledger::LedgerEntry;

#[derive(Tabled)]
struct InventoryRow {
    #[tabled(rename = "Id")]
    id: i32,
    #[tabled(rename = "Item Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Quantity")]
    quantity: i32,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Date Added")]
    date_added: String,
}

#[derive(Tabled)]
struct LedgerRow {
    #[tabled(rename = "Operation")]
    operation: String,
    #[tabled(rename = "Item Name")]
    item_name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Prev Quantity")]
    previous_quantity: String,
    #[tabled(rename = "New Quantity")]
    new_quantity: String,
    #[tabled(rename = "Previous Price")]
    previous_price: String,
    #[tabled(rename = "New Price")]
    new_price: String,
    #[tabled(rename = "Date Modified")]
    timestamp: String,
}

/// `YYYY-MM-DD HH:MM:SS`, sub-second precision dropped.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn or_blank<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn inventory_table(items: &[InventoryItem]) -> String {
    let mut sorted: Vec<&InventoryItem> = items.iter().collect();
    sorted.sort_by_key(|item| item.id);

    let rows: Vec<InventoryRow> = sorted
        .into_iter()
        .map(|item| InventoryRow {
            id: item.id.get(),
            name: item.name.clone(),
            category: item.category.clone(),
            quantity: item.quantity,
            price: item.price.to_string(),
            date_added: format_timestamp(&item.date_added),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn ledger_table(entries: &[LedgerEntry]) -> String {
    let mut sorted: Vec<&LedgerEntry> = entries.iter().collect();
    sorted.sort_by_key(|entry| entry.id);

    let rows: Vec<LedgerRow> = sorted
        .into_iter()
        .map(|entry| LedgerRow {
            operation: entry.operation_type.to_string(),
            item_name: entry.item_name.clone(),
            category: entry.category.clone().unwrap_or_default(),
            previous_quantity: or_blank(entry.previous_quantity),
            new_quantity: or_blank(entry.new_quantity),
            previous_price: or_blank(entry.previous_price),
            new_price: or_blank(entry.new_price),
            timestamp: format_timestamp(&entry.timestamp),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use stockbook_core::{ItemId, LedgerEntryId};
    use stockbook_ledger::OperationType;

    fn at(micros: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_micro_opt(14, 5, 7, micros)
            .unwrap()
    }

    fn item(id: i32, name: &str) -> InventoryItem {
        InventoryItem {
            id: ItemId::new(id),
            name: name.to_string(),
            category: "Tools".to_string(),
            quantity: 10,
            price: Decimal::new(550, 2),
            date_added: at(123_456),
        }
    }

    #[test]
    fn timestamps_drop_fractional_seconds() {
        assert_eq!(format_timestamp(&at(123_456)), "2024-03-09 14:05:07");
        assert_eq!(format_timestamp(&at(0)), "2024-03-09 14:05:07");
    }

    #[test]
    fn inventory_is_sorted_by_id() {
        let table = inventory_table(&[item(2, "Gadget"), item(1, "Widget")]);
        assert!(table.contains("Item Name"));
        assert!(table.contains("Date Added"));
        assert!(table.contains("5.50"));
        let widget = table.find("Widget").unwrap();
        let gadget = table.find("Gadget").unwrap();
        assert!(widget < gadget);
    }

    #[test]
    fn ledger_renders_nulls_as_blank() {
        let entry = LedgerEntry {
            id: LedgerEntryId::new(1),
            operation_type: OperationType::Insert,
            item_name: "Widget".to_string(),
            category: Some("Tools".to_string()),
            previous_quantity: None,
            new_quantity: Some(10),
            previous_price: None,
            new_price: Some(Decimal::new(550, 2)),
            timestamp: at(5),
        };
        let table = ledger_table(&[entry]);
        assert!(table.contains("INSERT"));
        assert!(table.contains("Prev Quantity"));
        assert!(table.contains("2024-03-09 14:05:07"));
        assert!(!table.contains("None"));
    }
}
