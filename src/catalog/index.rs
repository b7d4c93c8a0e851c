use std::sync::{Arc, Mutex, Weak};

use crate::catalog::database::Database;
use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::{CatalogObjectId, ResourceId};
use crate::catalog::kind::ObjectKind;
use crate::catalog::object::{CatalogObject, ObjectBase, lock};
use crate::catalog::quote::push_identifier;
use crate::catalog::schema::SchemaRef;
use crate::catalog::schema_object::{SchemaObject, SchemaObjectBase};
use crate::catalog::session::Session;
use crate::catalog::table::{Table, TableRef};

pub type IndexRef = Arc<Mutex<Index>>;

#[derive(Debug)]
pub struct Index {
    base: SchemaObjectBase,
    table: Weak<Mutex<Table>>,
    columns: Vec<String>,
    unique: bool,
    storage: Option<ResourceId>,
}

impl Index {
    pub fn new(
        database: &Arc<Database>,
        schema: &SchemaRef,
        table: &TableRef,
        id: CatalogObjectId,
        name: impl Into<String>,
        columns: Vec<String>,
        unique: bool,
    ) -> Self {
        Self {
            base: SchemaObjectBase::new(database, schema, id, name, ObjectKind::Index),
            table: Arc::downgrade(table),
            columns,
            unique,
            storage: None,
        }
    }

    /// Indexes created to back a constraint carry generated names and are
    /// hidden.
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.base = self.base.hidden(hidden);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn storage(&self) -> Option<ResourceId> {
        self.storage
    }

    pub fn attach_storage(&mut self, storage: ResourceId) {
        self.storage = Some(storage);
    }

    pub fn table(&self) -> CatalogResult<TableRef> {
        self.table.upgrade().ok_or_else(|| CatalogError::NotFound {
            kind: ObjectKind::TableOrView,
            name: format!("table of index {}", self.base.base()),
        })
    }

    pub fn covers(&self, columns: &[String]) -> bool {
        self.columns == columns
    }

    fn push_definition(&self, sql: &mut String, name: &str, table: &str) {
        sql.push_str(if self.unique {
            "CREATE UNIQUE INDEX "
        } else {
            "CREATE INDEX "
        });
        sql.push_str(name);
        sql.push_str(" ON ");
        sql.push_str(table);
        sql.push('(');
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            push_identifier(sql, column, true);
        }
        sql.push(')');
    }
}

/// Name of `table` qualified by its schema when it has one.
pub(crate) fn table_sql(table: &dyn CatalogObject) -> CatalogResult<String> {
    match table.as_schema_object() {
        Some(object) => object.qualified_name(true),
        None => table.render_name(true),
    }
}

impl CatalogObject for Index {
    fn base(&self) -> &ObjectBase {
        self.base.base()
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        self.base.base_mut()
    }

    fn create_sql(&self) -> CatalogResult<String> {
        let table = self.table()?;
        let table = table_sql(&*lock(&table)?)?;
        let mut sql = String::new();
        self.push_definition(&mut sql, &self.qualified_name(true)?, &table);
        Ok(sql)
    }

    fn create_sql_for_copy(&self, table: &dyn CatalogObject, quoted_name: &str) -> CatalogResult<String> {
        let mut sql = String::new();
        self.push_definition(&mut sql, quoted_name, &table_sql(table)?);
        Ok(sql)
    }

    fn drop_sql(&self) -> CatalogResult<String> {
        Ok(format!("DROP INDEX IF EXISTS {}", self.qualified_name(true)?))
    }

    fn remove_children_and_resources(&mut self, session: &mut dyn Session) -> CatalogResult<()> {
        if let Some(storage) = self.storage {
            session.release(storage)?;
            self.storage = None;
        }
        if let Some(table) = self.table.upgrade() {
            lock(&table)?.remove_dependent(ObjectKind::Index, self.id())?;
        }
        self.base.detach_from_schema()
    }

    fn check_rename(&self) -> CatalogResult<()> {
        if self.is_hidden() {
            return Err(CatalogError::rename_not_allowed(
                ObjectKind::Index,
                self.name()?,
                "generated index name",
            ));
        }
        Ok(())
    }

    fn as_schema_object(&self) -> Option<&dyn SchemaObject> {
        Some(self)
    }
}

impl SchemaObject for Index {
    fn schema_base(&self) -> &SchemaObjectBase {
        &self.base
    }
}
