use std::sync::{Arc, Mutex};

use crate::catalog::column::{ColumnId, ColumnMeta};
use crate::catalog::database::Database;
use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::{CatalogObjectId, ResourceId};
use crate::catalog::kind::ObjectKind;
use crate::catalog::object::{CatalogObject, Dependents, ObjectBase, ObjectRef};
use crate::catalog::schema::SchemaRef;
use crate::catalog::schema_object::{SchemaObject, SchemaObjectBase};
use crate::catalog::session::Session;

pub type TableRef = Arc<Mutex<Table>>;

#[derive(Debug)]
pub struct Table {
    base: SchemaObjectBase,
    columns: Vec<ColumnMeta>,
    storage: Option<ResourceId>,

    triggers: Dependents,
    constraints: Dependents,
    indexes: Dependents,
    sequences: Dependents,
}

impl Table {
    pub fn new(
        database: &Arc<Database>,
        schema: &SchemaRef,
        id: CatalogObjectId,
        name: impl Into<String>,
        columns: Vec<ColumnMeta>,
    ) -> Self {
        Self {
            base: SchemaObjectBase::new(database, schema, id, name, ObjectKind::TableOrView),
            columns,
            storage: None,
            triggers: Dependents::default(),
            constraints: Dependents::default(),
            indexes: Dependents::default(),
            sequences: Dependents::default(),
        }
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn column_by_name(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_by_id(&self, id: ColumnId) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn storage(&self) -> Option<ResourceId> {
        self.storage
    }

    pub fn attach_storage(&mut self, storage: ResourceId) {
        self.storage = Some(storage);
    }

    /// Registers a dependent. `kind` picks the list it is removed from
    /// later.
    pub fn add_dependent(&mut self, kind: ObjectKind, id: CatalogObjectId, object: ObjectRef) -> CatalogResult<()> {
        self.dependents_mut(kind)?.push(id, object);
        self.base.base_mut().mark_modified()
    }

    /// Forgets a dependent without locking it.
    pub fn remove_dependent(&mut self, kind: ObjectKind, id: CatalogObjectId) -> CatalogResult<()> {
        if self.dependents_mut(kind)?.remove(id).is_some() && self.is_valid() {
            self.base.base_mut().mark_modified()?;
        }
        Ok(())
    }

    pub fn dependents(&self, kind: ObjectKind) -> Vec<ObjectRef> {
        match kind {
            ObjectKind::Trigger => self.triggers.refs().collect(),
            ObjectKind::Constraint => self.constraints.refs().collect(),
            ObjectKind::Index => self.indexes.refs().collect(),
            ObjectKind::Sequence => self.sequences.refs().collect(),
            _ => Vec::new(),
        }
    }

    fn dependents_mut(&mut self, kind: ObjectKind) -> CatalogResult<&mut Dependents> {
        match kind {
            ObjectKind::Trigger => Ok(&mut self.triggers),
            ObjectKind::Constraint => Ok(&mut self.constraints),
            ObjectKind::Index => Ok(&mut self.indexes),
            ObjectKind::Sequence => Ok(&mut self.sequences),
            _ => Err(CatalogError::Unsupported {
                kind,
                operation: "table dependent",
            }),
        }
    }

    fn push_body(&self, out: &mut String) {
        out.push('(');
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            column.push_sql(out, true);
        }
        out.push(')');
    }

    fn create_prefix(&self) -> CatalogResult<&'static str> {
        Ok(if self.is_temporary()? {
            "CREATE LOCAL TEMPORARY TABLE "
        } else {
            "CREATE CACHED TABLE "
        })
    }
}

impl CatalogObject for Table {
    fn base(&self) -> &ObjectBase {
        self.base.base()
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        self.base.base_mut()
    }

    /// Triggers and constraints before the indexes they may rely on.
    fn children(&self) -> Vec<ObjectRef> {
        self.triggers
            .refs()
            .chain(self.constraints.refs())
            .chain(self.indexes.refs())
            .chain(self.sequences.refs())
            .collect()
    }

    fn create_sql(&self) -> CatalogResult<String> {
        let mut sql = String::from(self.create_prefix()?);
        sql.push_str(&self.qualified_name(true)?);
        self.push_body(&mut sql);
        Ok(sql)
    }

    fn create_sql_for_copy(&self, _table: &dyn CatalogObject, quoted_name: &str) -> CatalogResult<String> {
        let mut sql = String::from(self.create_prefix()?);
        sql.push_str(quoted_name);
        self.push_body(&mut sql);
        Ok(sql)
    }

    fn drop_sql(&self) -> CatalogResult<String> {
        Ok(format!("DROP TABLE IF EXISTS {} CASCADE", self.qualified_name(true)?))
    }

    fn remove_children_and_resources(&mut self, session: &mut dyn Session) -> CatalogResult<()> {
        if let Some(storage) = self.storage {
            session.release(storage)?;
            self.storage = None;
        }
        self.base.detach_from_schema()
    }

    fn check_rename(&self) -> CatalogResult<()> {
        Ok(())
    }

    fn as_schema_object(&self) -> Option<&dyn SchemaObject> {
        Some(self)
    }
}

impl SchemaObject for Table {
    fn schema_base(&self) -> &SchemaObjectBase {
        &self.base
    }
}
