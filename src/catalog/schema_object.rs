//! Objects that live inside a schema namespace.

use std::sync::{Arc, Weak};

use crate::catalog::database::Database;
use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::CatalogObjectId;
use crate::catalog::kind::ObjectKind;
use crate::catalog::object::{CatalogObject, ObjectBase, lock};
use crate::catalog::quote::push_identifier;
use crate::catalog::schema::{Schema, SchemaRef};

pub trait SchemaObject: CatalogObject {
    fn schema_base(&self) -> &SchemaObjectBase;

    fn schema(&self) -> CatalogResult<SchemaRef> {
        self.schema_base().schema()
    }

    /// Hidden objects are left out of metadata listings, scripts and
    /// `DROP ALL OBJECTS`, but are otherwise ordinary objects.
    fn is_hidden(&self) -> bool {
        self.schema_base().is_hidden()
    }

    /// `SCHEMA.NAME`, each part quoted as needed.
    fn qualified_name(&self, always_quote: bool) -> CatalogResult<String> {
        self.schema_base().qualified_name(always_quote)
    }
}

#[derive(Debug)]
pub struct SchemaObjectBase {
    base: ObjectBase,
    schema: Weak<std::sync::Mutex<Schema>>,
    hidden: bool,
}

impl SchemaObjectBase {
    pub fn new(
        database: &Arc<Database>,
        schema: &SchemaRef,
        id: CatalogObjectId,
        name: impl Into<String>,
        kind: ObjectKind,
    ) -> Self {
        Self {
            base: ObjectBase::new(database, id, name, kind),
            schema: Arc::downgrade(schema),
            hidden: false,
        }
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn base(&self) -> &ObjectBase {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn schema(&self) -> CatalogResult<SchemaRef> {
        // fail as "used after invalidation" before blaming the schema
        self.base.name()?;
        self.schema.upgrade().ok_or(CatalogError::NotFound {
            kind: ObjectKind::Schema,
            name: format!("schema of {}", self.base),
        })
    }

    pub fn schema_name(&self) -> CatalogResult<String> {
        let schema = self.schema()?;
        let guard = lock(&schema)?;
        Ok(guard.name()?.to_string())
    }

    pub fn qualified_name(&self, always_quote: bool) -> CatalogResult<String> {
        let mut out = String::new();
        push_identifier(&mut out, &self.schema_name()?, always_quote);
        out.push('.');
        push_identifier(&mut out, self.base.name()?, always_quote);
        Ok(out)
    }

    /// Drops this object's entry from the owning schema's namespace. A
    /// schema that is already gone has nothing left to detach from.
    pub fn detach_from_schema(&self) -> CatalogResult<()> {
        let id = self.base.id();
        let kind = self.base.kind();
        if let Some(schema) = self.schema.upgrade() {
            lock(&schema)?.remove(kind, id);
        }
        Ok(())
    }
}
