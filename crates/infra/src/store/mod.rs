//! Inventory + ledger store boundary.
//!
//! This module defines the typed, transactional storage abstraction and its
//! two implementations (in-memory for tests/dev, Postgres for production).

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;
pub use r#trait::{InventoryStore, Recorded, StoreError};
