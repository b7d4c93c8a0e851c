//! Identity and versioning provider shared by every catalog object.

use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};

use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::{CatalogObjectId, ModificationVersion};
use crate::catalog::trace::{Trace, TraceModule};
use crate::config::CatalogConfig;

/// Source of the database-wide modification counter.
pub trait VersionSource: Send + Sync {
    fn current(&self) -> ModificationVersion;

    /// Returns a value strictly greater than every value returned before.
    fn advance(&self) -> ModificationVersion;
}

#[derive(Debug)]
pub struct AtomicVersionCounter {
    value: AtomicU64,
}

impl AtomicVersionCounter {
    pub fn new(initial: u64) -> Self {
        Self {
            value: AtomicU64::new(initial),
        }
    }
}

impl VersionSource for AtomicVersionCounter {
    fn current(&self) -> ModificationVersion {
        ModificationVersion(self.value.load(Ordering::Acquire))
    }

    fn advance(&self) -> ModificationVersion {
        ModificationVersion(self.value.fetch_add(1, Ordering::AcqRel) + 1)
    }
}

pub struct Database {
    name: String,
    next_id: AtomicI32,
    versions: Box<dyn VersionSource>,
}

impl Database {
    pub fn new(config: &CatalogConfig) -> Self {
        Self::with_version_source(
            config,
            Box::new(AtomicVersionCounter::new(config.initial_version)),
        )
    }

    pub fn with_version_source(config: &CatalogConfig, versions: Box<dyn VersionSource>) -> Self {
        Self {
            name: config.database_name.clone(),
            next_id: AtomicI32::new(config.first_object_id.max(0)),
            versions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hands out a fresh object id. Ids are never reused.
    pub fn allocate_id(&self) -> CatalogResult<CatalogObjectId> {
        self.next_id
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |id| id.checked_add(1))
            .map(CatalogObjectId)
            .map_err(|_| CatalogError::IdSpaceExhausted)
    }

    pub fn current_version(&self) -> ModificationVersion {
        self.versions.current()
    }

    pub fn advance_version(&self) -> ModificationVersion {
        self.versions.advance()
    }

    pub fn trace(&self, module: TraceModule) -> Trace {
        Trace::new(&self.name, module)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("next_id", &self.next_id)
            .field("version", &self.versions.current())
            .finish()
    }
}
