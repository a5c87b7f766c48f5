//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Invoices and their line items are entities: two invoices with identical
/// fields are still different documents if their identifiers differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
