//! Execution context handed to resource-owning catalog operations.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::{CatalogObjectId, ResourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    HeapStorage,
    IndexStorage,
    SequenceCounter,
}

/// The session under which a catalog mutation runs. The caller holds
/// whatever exclusion the catalog needs before handing it in.
pub trait Session {
    fn id(&self) -> u32;

    fn allocate(&mut self, owner: CatalogObjectId, kind: ResourceKind) -> CatalogResult<ResourceId>;

    /// Frees a resource. Must fail, without side effects, when the resource
    /// is still in use.
    fn release(&mut self, resource: ResourceId) -> CatalogResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub owner: CatalogObjectId,
    pub kind: ResourceKind,
}

/// In-memory session that tracks resource ownership.
#[derive(Debug, Default)]
pub struct MemorySession {
    id: u32,
    next_resource: u64,
    live: BTreeMap<ResourceId, ResourceEntry>,
    pinned: BTreeSet<ResourceId>,
    released: Vec<ResourceId>,
}

impl MemorySession {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Marks a resource as in use; releasing it fails until unpinned.
    pub fn pin(&mut self, resource: ResourceId) -> bool {
        self.live.contains_key(&resource) && self.pinned.insert(resource)
    }

    pub fn unpin(&mut self, resource: ResourceId) -> bool {
        self.pinned.remove(&resource)
    }

    pub fn is_live(&self, resource: ResourceId) -> bool {
        self.live.contains_key(&resource)
    }

    pub fn live_resources(&self) -> impl Iterator<Item = (&ResourceId, &ResourceEntry)> {
        self.live.iter()
    }

    pub fn resources_of(&self, owner: CatalogObjectId) -> Vec<ResourceId> {
        self.live
            .iter()
            .filter(|(_, e)| e.owner == owner)
            .map(|(r, _)| *r)
            .collect()
    }

    /// Released resources, oldest first.
    pub fn released(&self) -> &[ResourceId] {
        &self.released
    }
}

impl Session for MemorySession {
    fn id(&self) -> u32 {
        self.id
    }

    fn allocate(&mut self, owner: CatalogObjectId, kind: ResourceKind) -> CatalogResult<ResourceId> {
        let resource = ResourceId(self.next_resource);
        self.next_resource += 1;
        self.live.insert(resource, ResourceEntry { owner, kind });
        Ok(resource)
    }

    fn release(&mut self, resource: ResourceId) -> CatalogResult<()> {
        let Some(entry) = self.live.get(&resource) else {
            return Err(CatalogError::UnknownResource { resource });
        };
        if self.pinned.contains(&resource) {
            return Err(CatalogError::ResourceBusy {
                owner: entry.owner,
                resource,
            });
        }
        self.live.remove(&resource);
        self.released.push(resource);
        Ok(())
    }
}
