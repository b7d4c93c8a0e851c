use std::sync::{Arc, Mutex, Weak};

use crate::catalog::database::Database;
use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::{CatalogObjectId, ResourceId};
use crate::catalog::kind::ObjectKind;
use crate::catalog::object::{CatalogObject, ObjectBase, lock};
use crate::catalog::schema::SchemaRef;
use crate::catalog::schema_object::{SchemaObject, SchemaObjectBase};
use crate::catalog::session::Session;
use crate::catalog::table::{Table, TableRef};

pub type SequenceRef = Arc<Mutex<Sequence>>;

#[derive(Debug)]
pub struct Sequence {
    base: SchemaObjectBase,
    next_value: i64,
    increment: i64,
    /// Last value handed out.
    current: Option<i64>,
    /// `next_value` would overflow; no value is left.
    exhausted: bool,
    counter: Option<ResourceId>,
    /// Set for sequences generated for identity columns.
    owner: Option<Weak<Mutex<Table>>>,
}

impl Sequence {
    pub fn new(
        database: &Arc<Database>,
        schema: &SchemaRef,
        id: CatalogObjectId,
        name: impl Into<String>,
        start: i64,
        increment: i64,
    ) -> CatalogResult<Self> {
        let base = SchemaObjectBase::new(database, schema, id, name, ObjectKind::Sequence);
        check_increment(base.base().name()?, increment)?;
        Ok(Self {
            base,
            next_value: start,
            increment,
            current: None,
            exhausted: false,
            counter: None,
            owner: None,
        })
    }

    /// Binds the sequence to an identity column of `table`. Such sequences
    /// are hidden and share the table's lifetime.
    pub fn owned_by(mut self, table: &TableRef) -> Self {
        self.owner = Some(Arc::downgrade(table));
        self.base = self.base.hidden(true);
        self
    }

    pub fn belongs_to_table(&self) -> bool {
        self.owner.is_some()
    }

    pub fn attach_counter(&mut self, counter: ResourceId) {
        self.counter = Some(counter);
    }

    pub fn counter(&self) -> Option<ResourceId> {
        self.counter
    }

    pub fn increment(&self) -> i64 {
        self.increment
    }

    pub fn table(&self) -> Option<TableRef> {
        self.owner.as_ref().and_then(Weak::upgrade)
    }

    pub fn current_value(&self) -> Option<i64> {
        self.current
    }

    /// Hands out the next value. Not a structural change, so the
    /// modification version stays put.
    pub fn next_value(&mut self) -> CatalogResult<i64> {
        let name = self.name()?;
        if self.exhausted {
            return Err(CatalogError::SequenceExhausted { name: name.to_string() });
        }
        let value = self.next_value;
        match value.checked_add(self.increment) {
            Some(next) => self.next_value = next,
            None => self.exhausted = true,
        }
        self.current = Some(value);
        Ok(value)
    }

    /// Changes start and increment, as `ALTER SEQUENCE` does.
    pub fn restart(&mut self, start: i64, increment: i64) -> CatalogResult<()> {
        check_increment(self.name()?, increment)?;
        self.base_mut().mark_modified()?;
        self.next_value = start;
        self.increment = increment;
        self.current = None;
        self.exhausted = false;
        Ok(())
    }
}

fn check_increment(name: &str, increment: i64) -> CatalogResult<()> {
    if increment == 0 {
        return Err(CatalogError::InvalidValue {
            kind: ObjectKind::Sequence,
            name: name.to_string(),
            reason: "increment must not be zero",
        });
    }
    Ok(())
}

impl CatalogObject for Sequence {
    fn base(&self) -> &ObjectBase {
        self.base.base()
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        self.base.base_mut()
    }

    fn create_sql(&self) -> CatalogResult<String> {
        Ok(format!(
            "CREATE SEQUENCE {} START WITH {} INCREMENT BY {}",
            self.qualified_name(true)?,
            self.next_value,
            self.increment
        ))
    }

    fn drop_sql(&self) -> CatalogResult<String> {
        Ok(format!("DROP SEQUENCE IF EXISTS {}", self.qualified_name(true)?))
    }

    fn remove_children_and_resources(&mut self, session: &mut dyn Session) -> CatalogResult<()> {
        if let Some(counter) = self.counter {
            session.release(counter)?;
            self.counter = None;
        }
        if let Some(table) = self.table() {
            lock(&table)?.remove_dependent(ObjectKind::Sequence, self.id())?;
        }
        self.base.detach_from_schema()
    }

    fn check_rename(&self) -> CatalogResult<()> {
        if self.belongs_to_table() {
            return Err(CatalogError::rename_not_allowed(
                ObjectKind::Sequence,
                self.name()?,
                "sequence belongs to a table",
            ));
        }
        Ok(())
    }

    fn as_schema_object(&self) -> Option<&dyn SchemaObject> {
        Some(self)
    }
}

impl SchemaObject for Sequence {
    fn schema_base(&self) -> &SchemaObjectBase {
        &self.base
    }
}
