use clap::{Args, Parser, Subcommand};

use stockbook_core::ItemId;
use stockbook_inventory::ItemForm;
use stockbook_observability::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "stockbook")]
#[command(version)]
#[command(about = "Inventory records with an append-only audit ledger")]
#[command(long_about = r#"
Every add, update and delete writes an audit entry to the ledger in the same
transaction as the inventory change.

Example usage:
  stockbook init-db
  stockbook add Widget Tools 10 5.50
  stockbook update 1 Widget Tools 20 6.00
  stockbook ledger
"#)]
pub struct Cli {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    pub database_url: Option<String>,

    /// Log output format: json or compact
    #[arg(long, default_value = "compact", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the inventory and ledger tables if they do not exist
    InitDb,

    /// List inventory items
    Items {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List ledger entries
    Ledger {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add a new item
    Add(ItemArgs),

    /// Overwrite an item's name, category, quantity and price
    Update {
        /// Id of the item to update
        id: ItemId,

        #[command(flatten)]
        item: ItemArgs,
    },

    /// Delete an item
    Delete {
        /// Id of the item to delete
        id: ItemId,
    },
}

/// Item fields as typed; validated by `ItemForm`, not by clap.
#[derive(Debug, Args)]
pub struct ItemArgs {
    /// Item name (must be unique)
    pub name: String,

    /// Category
    pub category: String,

    /// Quantity (whole number)
    #[arg(allow_hyphen_values = true)]
    pub quantity: String,

    /// Unit price (e.g. 5.50)
    #[arg(allow_hyphen_values = true)]
    pub price: String,
}

impl ItemArgs {
    pub fn to_form(&self) -> ItemForm {
        ItemForm::new(&self.name, &self.category, &self.quantity, &self.price)
    }
}
