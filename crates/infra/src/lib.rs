//! Infrastructure layer: storage backends, schema, configuration, and the
//! status-string data-access contract used by front ends.

pub mod config;
pub mod schema;
pub mod service;
pub mod store;

pub use config::{ConfigError, DatabaseConfig};
pub use service::{InventoryService, is_success};
pub use store::{
    InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, Recorded, StoreError,
};
