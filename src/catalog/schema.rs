//! Schemas: named namespaces holding tables, indexes, constraints,
//! sequences and triggers.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::catalog::database::Database;
use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::CatalogObjectId;
use crate::catalog::index::IndexRef;
use crate::catalog::kind::ObjectKind;
use crate::catalog::object::{CatalogObject, ObjectBase, ObjectRef};
use crate::catalog::quote::quote_identifier;
use crate::catalog::constraint::ConstraintRef;
use crate::catalog::sequence::SequenceRef;
use crate::catalog::session::Session;
use crate::catalog::table::TableRef;
use crate::catalog::trigger::TriggerRef;

pub type SchemaRef = Arc<Mutex<Schema>>;

/// Typed handle to an object stored in a schema.
#[derive(Debug, Clone)]
pub enum SchemaEntry {
    Table(TableRef),
    Index(IndexRef),
    Constraint(ConstraintRef),
    Sequence(SequenceRef),
    Trigger(TriggerRef),
}

impl SchemaEntry {
    pub fn kind(&self) -> ObjectKind {
        match self {
            SchemaEntry::Table(_) => ObjectKind::TableOrView,
            SchemaEntry::Index(_) => ObjectKind::Index,
            SchemaEntry::Constraint(_) => ObjectKind::Constraint,
            SchemaEntry::Sequence(_) => ObjectKind::Sequence,
            SchemaEntry::Trigger(_) => ObjectKind::Trigger,
        }
    }

    pub fn object(&self) -> ObjectRef {
        match self {
            SchemaEntry::Table(t) => t.clone() as ObjectRef,
            SchemaEntry::Index(i) => i.clone() as ObjectRef,
            SchemaEntry::Constraint(c) => c.clone() as ObjectRef,
            SchemaEntry::Sequence(s) => s.clone() as ObjectRef,
            SchemaEntry::Trigger(t) => t.clone() as ObjectRef,
        }
    }
}

#[derive(Debug)]
struct Slot {
    id: CatalogObjectId,
    entry: SchemaEntry,
}

/// Order in which a schema hands out its contents for removal: dependents
/// of tables first, then tables, then whatever tables did not take along.
const REMOVAL_ORDER: [ObjectKind; 5] = [
    ObjectKind::Trigger,
    ObjectKind::Constraint,
    ObjectKind::TableOrView,
    ObjectKind::Index,
    ObjectKind::Sequence,
];

#[derive(Debug)]
pub struct Schema {
    base: ObjectBase,
    owner: String,
    system: bool,
    namespaces: BTreeMap<ObjectKind, BTreeMap<String, Slot>>,
}

impl Schema {
    pub fn new(
        database: &Arc<Database>,
        id: CatalogObjectId,
        name: impl Into<String>,
        owner: impl Into<String>,
        system: bool,
    ) -> Self {
        Self {
            base: ObjectBase::new(database, id, name, ObjectKind::Schema),
            owner: owner.into(),
            system,
            namespaces: BTreeMap::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_system(&self) -> bool {
        self.system
    }

    pub fn set_owner(&mut self, owner: impl Into<String>) -> CatalogResult<()> {
        self.base.mark_modified()?;
        self.owner = owner.into();
        Ok(())
    }

    pub fn contains(&self, kind: ObjectKind, name: &str) -> bool {
        self.namespaces
            .get(&kind)
            .is_some_and(|ns| ns.contains_key(name))
    }

    pub fn add(&mut self, id: CatalogObjectId, name: &str, entry: SchemaEntry) -> CatalogResult<()> {
        let kind = entry.kind();
        let ns = self.namespaces.entry(kind).or_default();
        if ns.contains_key(name) {
            return Err(CatalogError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
        ns.insert(name.to_string(), Slot { id, entry });
        Ok(())
    }

    pub fn get(&self, kind: ObjectKind, name: &str) -> Option<SchemaEntry> {
        self.namespaces
            .get(&kind)
            .and_then(|ns| ns.get(name))
            .map(|slot| slot.entry.clone())
    }

    pub fn table(&self, name: &str) -> Option<TableRef> {
        match self.get(ObjectKind::TableOrView, name)? {
            SchemaEntry::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn index(&self, name: &str) -> Option<IndexRef> {
        match self.get(ObjectKind::Index, name)? {
            SchemaEntry::Index(i) => Some(i),
            _ => None,
        }
    }

    /// Drops the entry with the given id. Does not touch the object itself,
    /// so it is safe to call while the object is locked.
    pub fn remove(&mut self, kind: ObjectKind, id: CatalogObjectId) -> Option<SchemaEntry> {
        let ns = self.namespaces.get_mut(&kind)?;
        let name = ns
            .iter()
            .find(|(_, slot)| slot.id == id)
            .map(|(name, _)| name.clone())?;
        ns.remove(&name).map(|slot| slot.entry)
    }

    /// Re-keys an entry after its object was renamed.
    pub fn rename_entry(&mut self, kind: ObjectKind, old: &str, new: &str) -> CatalogResult<()> {
        let ns = self.namespaces.entry(kind).or_default();
        if ns.contains_key(new) {
            return Err(CatalogError::DuplicateName {
                kind,
                name: new.to_string(),
            });
        }
        let slot = ns.remove(old).ok_or_else(|| CatalogError::NotFound {
            kind,
            name: old.to_string(),
        })?;
        ns.insert(new.to_string(), slot);
        Ok(())
    }

    /// Entries of one kind in name order.
    pub fn entries(&self, kind: ObjectKind) -> Vec<SchemaEntry> {
        self.namespaces
            .get(&kind)
            .map(|ns| ns.values().map(|slot| slot.entry.clone()).collect())
            .unwrap_or_default()
    }
}

impl CatalogObject for Schema {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn children(&self) -> Vec<ObjectRef> {
        REMOVAL_ORDER
            .iter()
            .flat_map(|kind| self.entries(*kind))
            .map(|entry| entry.object())
            .collect()
    }

    fn create_sql(&self) -> CatalogResult<String> {
        Ok(format!(
            "CREATE SCHEMA IF NOT EXISTS {} AUTHORIZATION {}",
            self.render_name(true)?,
            quote_identifier(&self.owner, true)
        ))
    }

    fn drop_sql(&self) -> CatalogResult<String> {
        Ok(format!("DROP SCHEMA IF EXISTS {} CASCADE", self.render_name(true)?))
    }

    fn remove_children_and_resources(&mut self, _session: &mut dyn Session) -> CatalogResult<()> {
        // everything inside has been removed and detached by now
        self.namespaces.clear();
        Ok(())
    }

    fn check_rename(&self) -> CatalogResult<()> {
        if self.system {
            return Err(CatalogError::rename_not_allowed(
                ObjectKind::Schema,
                self.name()?,
                "system schema",
            ));
        }
        Ok(())
    }
}
