use std::sync::{Arc, Mutex, Weak};

use crate::catalog::cascade::remove_cascade;
use crate::catalog::database::Database;
use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::CatalogObjectId;
use crate::catalog::index::{Index, IndexRef, table_sql};
use crate::catalog::kind::ObjectKind;
use crate::catalog::object::{CatalogObject, ObjectBase, ObjectRef, lock};
use crate::catalog::quote::push_identifier;
use crate::catalog::schema::SchemaRef;
use crate::catalog::schema_object::{SchemaObject, SchemaObjectBase};
use crate::catalog::session::Session;
use crate::catalog::table::{Table, TableRef};

pub type ConstraintRef = Arc<Mutex<Constraint>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintType {
    PrimaryKey { columns: Vec<String> },
    Unique { columns: Vec<String> },
    /// Condition kept as SQL text; evaluating it is the executor's job.
    Check { condition: String },
}

impl ConstraintType {
    pub fn columns(&self) -> &[String] {
        match self {
            ConstraintType::PrimaryKey { columns } | ConstraintType::Unique { columns } => columns,
            ConstraintType::Check { .. } => &[],
        }
    }

    pub fn needs_index(&self) -> bool {
        !matches!(self, ConstraintType::Check { .. })
    }
}

#[derive(Debug)]
pub struct Constraint {
    base: SchemaObjectBase,
    table: Weak<Mutex<Table>>,
    constraint_type: ConstraintType,
    index: Option<Weak<Mutex<Index>>>,
    /// The index was created for this constraint and goes away with it.
    owns_index: bool,
}

impl Constraint {
    pub fn new(
        database: &Arc<Database>,
        schema: &SchemaRef,
        table: &TableRef,
        id: CatalogObjectId,
        name: impl Into<String>,
        constraint_type: ConstraintType,
    ) -> Self {
        Self {
            base: SchemaObjectBase::new(database, schema, id, name, ObjectKind::Constraint),
            table: Arc::downgrade(table),
            constraint_type,
            index: None,
            owns_index: false,
        }
    }

    pub fn with_index(mut self, index: &IndexRef, owned: bool) -> Self {
        self.index = Some(Arc::downgrade(index));
        self.owns_index = owned;
        self
    }

    pub fn constraint_type(&self) -> &ConstraintType {
        &self.constraint_type
    }

    pub fn index(&self) -> Option<IndexRef> {
        self.index.as_ref().and_then(Weak::upgrade)
    }

    pub fn owns_index(&self) -> bool {
        self.owns_index
    }

    fn table(&self) -> CatalogResult<TableRef> {
        self.table.upgrade().ok_or_else(|| CatalogError::NotFound {
            kind: ObjectKind::TableOrView,
            name: format!("table of constraint {}", self.base.base()),
        })
    }

    fn push_definition(&self, sql: &mut String, table: &str, name: &str) {
        sql.push_str("ALTER TABLE ");
        sql.push_str(table);
        sql.push_str(" ADD CONSTRAINT ");
        sql.push_str(name);
        match &self.constraint_type {
            ConstraintType::PrimaryKey { columns } => {
                sql.push_str(" PRIMARY KEY");
                push_column_list(sql, columns);
            }
            ConstraintType::Unique { columns } => {
                sql.push_str(" UNIQUE");
                push_column_list(sql, columns);
            }
            ConstraintType::Check { condition } => {
                sql.push_str(" CHECK(");
                sql.push_str(condition);
                sql.push(')');
            }
        }
    }
}

fn push_column_list(sql: &mut String, columns: &[String]) {
    sql.push('(');
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        push_identifier(sql, column, true);
    }
    sql.push(')');
}

impl CatalogObject for Constraint {
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
        self.push_definition(&mut sql, &table, &self.qualified_name(true)?);
        // a generated index is recreated by the constraint itself
        if let (Some(index), false) = (self.index(), self.owns_index) {
            let index = lock(&index)?;
            if index.is_valid() {
                sql.push_str(" INDEX ");
                sql.push_str(&index.qualified_name(true)?);
            }
        }
        Ok(sql)
    }

    fn create_sql_for_copy(&self, table: &dyn CatalogObject, quoted_name: &str) -> CatalogResult<String> {
        let mut sql = String::new();
        self.push_definition(&mut sql, &table_sql(table)?, quoted_name);
        Ok(sql)
    }

    fn drop_sql(&self) -> CatalogResult<String> {
        let table = self.table()?;
        let table = table_sql(&*lock(&table)?)?;
        Ok(format!(
            "ALTER TABLE {} DROP CONSTRAINT IF EXISTS {}",
            table,
            self.qualified_name(true)?
        ))
    }

    fn remove_children_and_resources(&mut self, session: &mut dyn Session) -> CatalogResult<()> {
        if self.owns_index {
            if let Some(index) = self.index() {
                let index: ObjectRef = index;
                if lock(&index)?.is_valid() {
                    remove_cascade(&index, session)?;
                }
            }
        }
        if let Some(table) = self.table.upgrade() {
            lock(&table)?.remove_dependent(ObjectKind::Constraint, self.id())?;
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

impl SchemaObject for Constraint {
    fn schema_base(&self) -> &SchemaObjectBase {
        &self.base
    }
}
