use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use crate::catalog::database::Database;
use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::CatalogObjectId;
use crate::catalog::index::table_sql;
use crate::catalog::kind::ObjectKind;
use crate::catalog::object::{CatalogObject, ObjectBase, lock};
use crate::catalog::quote::push_identifier;
use crate::catalog::schema::SchemaRef;
use crate::catalog::schema_object::{SchemaObject, SchemaObjectBase};
use crate::catalog::session::Session;
use crate::catalog::table::{Table, TableRef};

pub type TriggerRef = Arc<Mutex<Trigger>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerTiming {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for TriggerTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerTiming::Before => write!(f, "BEFORE"),
            TriggerTiming::After => write!(f, "AFTER"),
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerEvent::Insert => write!(f, "INSERT"),
            TriggerEvent::Update => write!(f, "UPDATE"),
            TriggerEvent::Delete => write!(f, "DELETE"),
        }
    }
}

#[derive(Debug)]
pub struct Trigger {
    base: SchemaObjectBase,
    table: Weak<Mutex<Table>>,
    timing: TriggerTiming,
    events: Vec<TriggerEvent>,
    /// Name the executor resolves to the trigger implementation.
    handler: String,
}

impl Trigger {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        database: &Arc<Database>,
        schema: &SchemaRef,
        table: &TableRef,
        id: CatalogObjectId,
        name: impl Into<String>,
        timing: TriggerTiming,
        events: Vec<TriggerEvent>,
        handler: impl Into<String>,
    ) -> Self {
        Self {
            base: SchemaObjectBase::new(database, schema, id, name, ObjectKind::Trigger),
            table: Arc::downgrade(table),
            timing,
            events,
            handler: handler.into(),
        }
    }

    pub fn timing(&self) -> TriggerTiming {
        self.timing
    }

    pub fn events(&self) -> &[TriggerEvent] {
        &self.events
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    fn push_definition(&self, sql: &mut String, name: &str, table: &str) {
        sql.push_str("CREATE FORCE TRIGGER ");
        sql.push_str(name);
        sql.push(' ');
        sql.push_str(&self.timing.to_string());
        sql.push(' ');
        let events: Vec<String> = self.events.iter().map(ToString::to_string).collect();
        sql.push_str(&events.join(", "));
        sql.push_str(" ON ");
        sql.push_str(table);
        sql.push_str(" FOR EACH ROW CALL ");
        push_identifier(sql, &self.handler, true);
    }
}

impl CatalogObject for Trigger {
    fn base(&self) -> &ObjectBase {
        self.base.base()
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        self.base.base_mut()
    }

    fn create_sql(&self) -> CatalogResult<String> {
        let table = self.table.upgrade().ok_or_else(|| CatalogError::NotFound {
            kind: ObjectKind::TableOrView,
            name: format!("table of trigger {}", self.base.base()),
        })?;
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
        Ok(format!("DROP TRIGGER IF EXISTS {}", self.qualified_name(true)?))
    }

    fn remove_children_and_resources(&mut self, _session: &mut dyn Session) -> CatalogResult<()> {
        if let Some(table) = self.table.upgrade() {
            lock(&table)?.remove_dependent(ObjectKind::Trigger, self.id())?;
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

impl SchemaObject for Trigger {
    fn schema_base(&self) -> &SchemaObjectBase {
        &self.base
    }
}
