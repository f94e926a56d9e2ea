//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Inventory items and ledger entries are both identified by a
/// storage-generated key; two values with the same id are the same record,
/// even if one is a stale snapshot.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
