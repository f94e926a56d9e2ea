//! Audit ledger module (append-only record of inventory mutations).
//!
//! Pure domain logic only: no IO, no persistence concerns. Stores decide when
//! an entry is written; this crate decides what it contains.

pub mod entry;

pub use entry::{LedgerEntry, NewLedgerEntry, OperationType};
