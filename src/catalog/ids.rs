//! Catalog object identifiers and modification versions.
//!
//! Object ids are stable and must never be reused while any reference to the
//! object might still exist. `-1` is reserved for invalidated objects.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CatalogObjectId(pub i32);

impl CatalogObjectId {
    pub const INVALID: CatalogObjectId = CatalogObjectId(-1);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for CatalogObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Value of the database-wide modification counter.
///
/// Every object records the value current at creation and moves to the next
/// value on each structural change. Caches compare these to detect staleness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModificationVersion(pub u64);

impl ModificationVersion {
    pub fn next(self) -> Self {
        ModificationVersion(self.0 + 1)
    }
}

impl fmt::Display for ModificationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Handle to a non-catalog resource (heap pages, index structure, sequence
/// counter) owned by a catalog object and released during removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);
