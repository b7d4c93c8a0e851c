//! Database-level registry: maps names to catalog objects, creates them,
//! and drives rename and drop through the object capability.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tracing::instrument;

use crate::catalog::cascade::{RemovalReport, remove_cascade};
use crate::catalog::column::{ColumnDef, ColumnId, ColumnMeta};
use crate::catalog::comment::{Comment, CommentRef};
use crate::catalog::constraint::{Constraint, ConstraintRef, ConstraintType};
use crate::catalog::database::Database;
use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::CatalogObjectId;
use crate::catalog::index::{Index, IndexRef};
use crate::catalog::kind::ObjectKind;
use crate::catalog::object::{CatalogObject, ObjectRef, lock};
use crate::catalog::quote::quote_identifier;
use crate::catalog::schema::{Schema, SchemaEntry, SchemaRef};
use crate::catalog::sequence::{Sequence, SequenceRef};
use crate::catalog::session::{ResourceKind, Session};
use crate::catalog::setting::{Setting, SettingRef, SettingValue};
use crate::catalog::table::{Table, TableRef};
use crate::catalog::trigger::{Trigger, TriggerEvent, TriggerRef, TriggerTiming};
use crate::catalog::user::{PUBLIC_ROLE, Role, RoleRef, User, UserRef};
use crate::config::CatalogConfig;

/// Creation order inside a schema; the reverse of removal order.
const SCRIPT_ORDER: [ObjectKind; 5] = [
    ObjectKind::Sequence,
    ObjectKind::TableOrView,
    ObjectKind::Index,
    ObjectKind::Constraint,
    ObjectKind::Trigger,
];

pub struct Catalog {
    config: CatalogConfig,
    database: Arc<Database>,

    schemas: BTreeMap<String, SchemaRef>,
    users: BTreeMap<String, UserRef>,
    roles: BTreeMap<String, RoleRef>,
    settings: BTreeMap<String, SettingRef>,
    comments: BTreeMap<CatalogObjectId, CommentRef>,
}

impl Catalog {
    pub fn new(config: CatalogConfig) -> CatalogResult<Self> {
        let database = Arc::new(Database::new(&config));
        let mut catalog = Self {
            config,
            database,
            schemas: BTreeMap::new(),
            users: BTreeMap::new(),
            roles: BTreeMap::new(),
            settings: BTreeMap::new(),
            comments: BTreeMap::new(),
        };

        let db = Arc::clone(&catalog.database);
        let admin = catalog.config.system_user.clone();
        let user = User::new(&db, db.allocate_id()?, admin.as_str(), true).system();
        catalog.users.insert(admin.clone(), Arc::new(Mutex::new(user)));

        let public = Role::new(&db, db.allocate_id()?, PUBLIC_ROLE, true);
        catalog
            .roles
            .insert(PUBLIC_ROLE.to_string(), Arc::new(Mutex::new(public)));

        let mut system_schemas = vec![catalog.config.main_schema.clone()];
        system_schemas.extend(catalog.config.system_schemas.iter().cloned());
        for name in system_schemas {
            let system = catalog.config.is_system_schema(&name);
            let schema = Schema::new(&db, db.allocate_id()?, name.as_str(), admin.as_str(), system);
            catalog.schemas.insert(name, Arc::new(Mutex::new(schema)));
        }

        Ok(catalog)
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.database
    }

    // ---------- lookup ----------

    pub fn schema(&self, name: &str) -> CatalogResult<SchemaRef> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(ObjectKind::Schema, name))
    }

    pub fn table(&self, schema: &str, name: &str) -> CatalogResult<TableRef> {
        let schema = self.schema(schema)?;
        let table = lock(&schema)?.table(name);
        table.ok_or_else(|| not_found(ObjectKind::TableOrView, name))
    }

    pub fn user(&self, name: &str) -> CatalogResult<UserRef> {
        self.users
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(ObjectKind::User, name))
    }

    /// Resolves a name of any kind. Schema-bound kinds default to the main
    /// schema.
    pub fn find(&self, kind: ObjectKind, schema: Option<&str>, name: &str) -> CatalogResult<ObjectRef> {
        let found: Option<ObjectRef> = match kind {
            ObjectKind::Schema => self.schemas.get(name).map(|s| s.clone() as ObjectRef),
            ObjectKind::User => self.users.get(name).map(|u| u.clone() as ObjectRef),
            ObjectKind::Role => self.roles.get(name).map(|r| r.clone() as ObjectRef),
            ObjectKind::Setting => self.settings.get(name).map(|s| s.clone() as ObjectRef),
            kind if kind.is_schema_bound() => {
                let schema = self.schema(schema.unwrap_or(&self.config.main_schema))?;
                let entry = lock(&schema)?.get(kind, name);
                entry.map(|e| e.object())
            }
            _ => None,
        };
        found.ok_or_else(|| not_found(kind, name))
    }

    pub fn exists(&self, kind: ObjectKind, schema: Option<&str>, name: &str) -> bool {
        self.find(kind, schema, name).is_ok()
    }

    // ---------- database-level objects ----------

    pub fn create_user(&mut self, name: &str, admin: bool) -> CatalogResult<UserRef> {
        if self.users.contains_key(name) {
            return Err(duplicate(ObjectKind::User, name));
        }
        let user = User::new(&self.database, self.database.allocate_id()?, name, admin);
        let user = Arc::new(Mutex::new(user));
        self.users.insert(name.to_string(), user.clone());
        tracing::info!(user = name, admin, "created user");
        Ok(user)
    }

    pub fn create_role(&mut self, name: &str) -> CatalogResult<RoleRef> {
        if self.roles.contains_key(name) {
            return Err(duplicate(ObjectKind::Role, name));
        }
        let role = Role::new(&self.database, self.database.allocate_id()?, name, false);
        let role = Arc::new(Mutex::new(role));
        self.roles.insert(name.to_string(), role.clone());
        tracing::info!(role = name, "created role");
        Ok(role)
    }

    pub fn set_setting(&mut self, name: &str, value: SettingValue) -> CatalogResult<SettingRef> {
        if let Some(setting) = self.settings.get(name) {
            lock(setting)?.set_value(value)?;
            return Ok(setting.clone());
        }
        let setting = Setting::new(&self.database, self.database.allocate_id()?, name, value);
        let setting = Arc::new(Mutex::new(setting));
        self.settings.insert(name.to_string(), setting.clone());
        Ok(setting)
    }

    pub fn create_schema(&mut self, name: &str, owner: &str) -> CatalogResult<SchemaRef> {
        if self.schemas.contains_key(name) {
            return Err(duplicate(ObjectKind::Schema, name));
        }
        self.user(owner)?;
        let schema = Schema::new(&self.database, self.database.allocate_id()?, name, owner, false);
        let schema = Arc::new(Mutex::new(schema));
        self.schemas.insert(name.to_string(), schema.clone());
        tracing::info!(schema = name, owner, "created schema");
        Ok(schema)
    }

    // ---------- schema objects ----------

    #[instrument(name = "catalog::create_table", level = "debug", skip(self, session, columns))]
    pub fn create_table(
        &mut self,
        session: &mut dyn Session,
        schema_name: &str,
        name: &str,
        columns: Vec<ColumnDef>,
        temporary: bool,
    ) -> CatalogResult<TableRef> {
        let schema = self.schema(schema_name)?;
        ensure_free(&schema, ObjectKind::TableOrView, name)?;
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(duplicate(ObjectKind::TableOrView, &format!("{name}.{}", column.name)));
            }
            if column.identity && !column.data_type.is_integer() {
                return Err(CatalogError::InvalidValue {
                    kind: ObjectKind::TableOrView,
                    name: format!("{name}.{}", column.name),
                    reason: "identity column must have an integer type",
                });
            }
        }

        let db = &self.database;
        let id = db.allocate_id()?;
        let identity: Vec<String> = columns
            .iter()
            .filter(|c| c.identity)
            .map(|c| c.name.clone())
            .collect();
        let metas = columns
            .into_iter()
            .enumerate()
            .map(|(i, def)| ColumnMeta::from_def(ColumnId(i as u32), def))
            .collect();

        let mut table = Table::new(db, &schema, id, name, metas);
        table.set_temporary(temporary)?;
        table.attach_storage(session.allocate(id, ResourceKind::HeapStorage)?);
        let table = Arc::new(Mutex::new(table));
        lock(&schema)?.add(id, name, SchemaEntry::Table(table.clone()))?;

        for column in identity {
            let seq_id = db.allocate_id()?;
            let seq_name = format!("SYSTEM_SEQUENCE_{}", seq_id.0);
            let mut sequence = Sequence::new(db, &schema, seq_id, seq_name.as_str(), 1, 1)?.owned_by(&table);
            sequence.set_temporary(temporary)?;
            sequence.attach_counter(session.allocate(seq_id, ResourceKind::SequenceCounter)?);
            let sequence = Arc::new(Mutex::new(sequence));
            lock(&schema)?.add(seq_id, &seq_name, SchemaEntry::Sequence(sequence.clone()))?;
            lock(&table)?.add_dependent(ObjectKind::Sequence, seq_id, sequence)?;
            tracing::debug!(table = name, column = %column, sequence = %seq_name, "identity sequence");
        }

        tracing::info!(schema = schema_name, table = name, temporary, "created table");
        Ok(table)
    }

    pub fn create_index(
        &mut self,
        session: &mut dyn Session,
        schema_name: &str,
        table_name: &str,
        name: &str,
        columns: &[&str],
        unique: bool,
    ) -> CatalogResult<IndexRef> {
        let schema = self.schema(schema_name)?;
        let table = self.table(schema_name, table_name)?;
        ensure_free(&schema, ObjectKind::Index, name)?;
        let columns = checked_columns(&table, columns)?;
        let id = self.database.allocate_id()?;
        self.build_index(session, &schema, &table, id, name, columns, unique, false)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_index(
        &self,
        session: &mut dyn Session,
        schema: &SchemaRef,
        table: &TableRef,
        id: CatalogObjectId,
        name: &str,
        columns: Vec<String>,
        unique: bool,
        hidden: bool,
    ) -> CatalogResult<IndexRef> {
        let temporary = lock(table)?.is_temporary()?;
        let mut index = Index::new(&self.database, schema, table, id, name, columns, unique).hidden(hidden);
        index.set_temporary(temporary)?;
        index.attach_storage(session.allocate(id, ResourceKind::IndexStorage)?);
        let index = Arc::new(Mutex::new(index));
        lock(schema)?.add(id, name, SchemaEntry::Index(index.clone()))?;
        lock(table)?.add_dependent(ObjectKind::Index, id, index.clone())?;
        tracing::debug!(index = name, hidden, "created index");
        Ok(index)
    }

    /// Adds a constraint. Primary key and unique constraints reuse a unique
    /// index on exactly their columns, or get a hidden one of their own.
    pub fn add_constraint(
        &mut self,
        session: &mut dyn Session,
        schema_name: &str,
        table_name: &str,
        name: &str,
        constraint_type: ConstraintType,
    ) -> CatalogResult<ConstraintRef> {
        let schema = self.schema(schema_name)?;
        let table = self.table(schema_name, table_name)?;
        ensure_free(&schema, ObjectKind::Constraint, name)?;
        let column_names: Vec<&str> = constraint_type.columns().iter().map(String::as_str).collect();
        let columns = checked_columns(&table, &column_names)?;

        let index = if constraint_type.needs_index() {
            match find_covering_index(&schema, &table, &columns)? {
                Some(index) => Some((index, false)),
                None => {
                    let id = self.database.allocate_id()?;
                    let index_name = format!("{name}_INDEX_{}", id.0);
                    let index = self.build_index(session, &schema, &table, id, &index_name, columns, true, true)?;
                    Some((index, true))
                }
            }
        } else {
            None
        };

        let id = self.database.allocate_id()?;
        let mut constraint = Constraint::new(&self.database, &schema, &table, id, name, constraint_type);
        if let Some((index, owned)) = &index {
            constraint = constraint.with_index(index, *owned);
        }
        constraint.set_temporary(lock(&table)?.is_temporary()?)?;
        let constraint = Arc::new(Mutex::new(constraint));
        lock(&schema)?.add(id, name, SchemaEntry::Constraint(constraint.clone()))?;
        lock(&table)?.add_dependent(ObjectKind::Constraint, id, constraint.clone())?;
        tracing::info!(table = table_name, constraint = name, "added constraint");
        Ok(constraint)
    }

    pub fn create_sequence(
        &mut self,
        session: &mut dyn Session,
        schema_name: &str,
        name: &str,
        start: i64,
        increment: i64,
    ) -> CatalogResult<SequenceRef> {
        let schema = self.schema(schema_name)?;
        ensure_free(&schema, ObjectKind::Sequence, name)?;
        let id = self.database.allocate_id()?;
        let mut sequence = Sequence::new(&self.database, &schema, id, name, start, increment)?;
        sequence.attach_counter(session.allocate(id, ResourceKind::SequenceCounter)?);
        let sequence = Arc::new(Mutex::new(sequence));
        lock(&schema)?.add(id, name, SchemaEntry::Sequence(sequence.clone()))?;
        Ok(sequence)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_trigger(
        &mut self,
        schema_name: &str,
        table_name: &str,
        name: &str,
        timing: TriggerTiming,
        events: Vec<TriggerEvent>,
        handler: &str,
    ) -> CatalogResult<TriggerRef> {
        let schema = self.schema(schema_name)?;
        let table = self.table(schema_name, table_name)?;
        ensure_free(&schema, ObjectKind::Trigger, name)?;
        let id = self.database.allocate_id()?;
        let mut trigger = Trigger::new(&self.database, &schema, &table, id, name, timing, events, handler);
        trigger.set_temporary(lock(&table)?.is_temporary()?)?;
        let trigger = Arc::new(Mutex::new(trigger));
        lock(&schema)?.add(id, name, SchemaEntry::Trigger(trigger.clone()))?;
        lock(&table)?.add_dependent(ObjectKind::Trigger, id, trigger.clone())?;
        Ok(trigger)
    }

    /// Creates an empty table shaped like `source` and returns the
    /// statements that recreate the source's indexes, constraints and
    /// triggers on it.
    pub fn copy_table(
        &mut self,
        session: &mut dyn Session,
        schema_name: &str,
        source: &str,
        new_name: &str,
    ) -> CatalogResult<(TableRef, Vec<String>)> {
        let source = self.table(schema_name, source)?;
        let (columns, temporary, children) = {
            let guard = lock(&source)?;
            let columns: Vec<ColumnDef> = guard
                .columns()
                .iter()
                .map(|c| ColumnDef {
                    name: c.name.clone(),
                    data_type: c.data_type.clone(),
                    nullable: c.nullable,
                    identity: c.identity,
                })
                .collect();
            (columns, guard.is_temporary()?, guard.children())
        };
        let copy = self.create_table(session, schema_name, new_name, columns, temporary)?;

        let mut statements = Vec::new();
        let target = lock(&copy)?;
        for child in children.iter().rev() {
            let child = lock(child)?;
            // generated objects come back with the table or its constraints
            if child.as_schema_object().is_some_and(|o| o.is_hidden()) {
                continue;
            }
            let quoted = quote_identifier(&format!("{new_name}_{}", child.name()?), true);
            statements.push(child.create_sql_for_copy(&*target, &quoted)?);
        }
        drop(target);
        Ok((copy, statements))
    }

    // ---------- comments ----------

    pub fn set_comment(
        &mut self,
        session: &mut dyn Session,
        kind: ObjectKind,
        schema: Option<&str>,
        name: &str,
        text: Option<String>,
    ) -> CatalogResult<()> {
        let target = self.find(kind, schema, name)?;
        let target_id = {
            let mut guard = lock(&target)?;
            guard.set_comment(text.clone())?;
            guard.id()
        };

        match (self.comments.get(&target_id).cloned(), text) {
            (Some(comment), Some(text)) => {
                lock(&comment)?.set_text(Some(text))?;
            }
            (Some(comment), None) => {
                let comment: ObjectRef = comment;
                remove_cascade(&comment, session)?;
                self.comments.remove(&target_id);
            }
            (None, Some(text)) => {
                let comment = Comment::new(
                    &self.database,
                    self.database.allocate_id()?,
                    &target,
                    kind,
                    target_id,
                    Some(text),
                );
                self.comments
                    .insert(target_id, Arc::new(Mutex::new(comment)));
            }
            (None, None) => {}
        }
        Ok(())
    }

    pub fn comment_on(&self, target: CatalogObjectId) -> Option<CommentRef> {
        self.comments.get(&target).cloned()
    }

    // ---------- rename ----------

    /// Renames an object, then re-keys the registry entry.
    #[instrument(name = "catalog::rename", level = "debug", skip(self))]
    pub fn rename(&mut self, kind: ObjectKind, schema: Option<&str>, old: &str, new: &str) -> CatalogResult<()> {
        let object = self.find(kind, schema, old)?;
        if old != new && self.exists(kind, schema, new) {
            return Err(duplicate(kind, new));
        }
        lock(&object)?.rename(new)?;

        match kind {
            ObjectKind::Schema => rekey(&mut self.schemas, old, new),
            ObjectKind::Role => rekey(&mut self.roles, old, new),
            ObjectKind::User => {
                rekey(&mut self.users, old, new);
                for schema in self.schemas.values() {
                    let mut schema = lock(schema)?;
                    if schema.owner() == old {
                        schema.set_owner(new)?;
                    }
                }
            }
            kind => {
                let schema = self.schema(schema.unwrap_or(&self.config.main_schema))?;
                lock(&schema)?.rename_entry(kind, old, new)?;
            }
        }
        Ok(())
    }

    // ---------- drop ----------

    /// Removes an object and everything depending on it.
    #[instrument(name = "catalog::drop_object", level = "debug", skip(self, session))]
    pub fn drop_object(
        &mut self,
        session: &mut dyn Session,
        kind: ObjectKind,
        schema: Option<&str>,
        name: &str,
    ) -> CatalogResult<RemovalReport> {
        let object = self.find(kind, schema, name)?;
        self.check_droppable(kind, schema, name)?;

        let result = remove_cascade(&object, session);
        let pruned = self.prune(session);
        let mut report = result?;
        report.merge(pruned?);
        Ok(report)
    }

    fn check_droppable(&self, kind: ObjectKind, schema: Option<&str>, name: &str) -> CatalogResult<()> {
        let system = match kind {
            ObjectKind::Schema => {
                let schema = self.schema(name)?;
                lock(&schema)?.is_system()
            }
            ObjectKind::User => {
                let user = self.user(name)?;
                if lock(&user)?.is_system() {
                    return Err(CatalogError::Unsupported {
                        kind,
                        operation: "drop of a system object",
                    });
                }
                for schema in self.schemas.values() {
                    let schema = lock(schema)?;
                    if schema.owner() == name {
                        return Err(in_use(kind, name, format!("schema {}", schema.name()?)));
                    }
                }
                false
            }
            ObjectKind::Index => {
                let schema = self.schema(schema.unwrap_or(&self.config.main_schema))?;
                if let Some(constraint) = constraint_using_index(&schema, name)? {
                    return Err(in_use(kind, name, format!("constraint {constraint}")));
                }
                false
            }
            ObjectKind::Sequence => {
                let schema = self.schema(schema.unwrap_or(&self.config.main_schema))?;
                let entry = lock(&schema)?.get(kind, name);
                if let Some(SchemaEntry::Sequence(sequence)) = entry {
                    let table = lock(&sequence)?.table();
                    if let Some(table) = table {
                        let table = lock(&table)?;
                        return Err(in_use(kind, name, format!("table {}", table.name()?)));
                    }
                }
                false
            }
            ObjectKind::Role => name == PUBLIC_ROLE,
            ObjectKind::Setting => true,
            _ => false,
        };
        if system {
            return Err(CatalogError::Unsupported {
                kind,
                operation: "drop of a system object",
            });
        }
        Ok(())
    }

    /// `DROP ALL OBJECTS`: every visible schema object, then non-system
    /// schemas, roles and users. Hidden objects go along with their owners.
    #[instrument(name = "catalog::drop_all_objects", level = "debug", skip_all)]
    pub fn drop_all_objects(&mut self, session: &mut dyn Session) -> CatalogResult<RemovalReport> {
        let mut report = RemovalReport::default();
        let result = self.drop_all_inner(session, &mut report);
        let pruned = self.prune(session);
        result?;
        report.merge(pruned?);
        Ok(report)
    }

    fn drop_all_inner(&self, session: &mut dyn Session, report: &mut RemovalReport) -> CatalogResult<()> {
        let schemas: Vec<SchemaRef> = self.schemas.values().cloned().collect();
        for schema in &schemas {
            let children = lock(schema)?.children();
            for child in children {
                let skip = {
                    let guard = lock(&child)?;
                    !guard.is_valid() || guard.as_schema_object().is_some_and(|o| o.is_hidden())
                };
                if !skip {
                    report.merge(remove_cascade(&child, session)?);
                }
            }
        }

        let mut leftovers: Vec<ObjectRef> = Vec::new();
        for schema in schemas {
            if !lock(&schema)?.is_system() {
                leftovers.push(schema);
            }
        }
        for role in self.roles.values() {
            if !lock(role)?.is_system() {
                leftovers.push(role.clone());
            }
        }
        for user in self.users.values() {
            if !lock(user)?.is_system() {
                leftovers.push(user.clone());
            }
        }
        for object in leftovers {
            report.merge(remove_cascade(&object, session)?);
        }
        Ok(())
    }

    /// Forgets invalidated entries and removes comments whose target is
    /// gone.
    fn prune(&mut self, session: &mut dyn Session) -> CatalogResult<RemovalReport> {
        retain_valid(&mut self.schemas)?;
        retain_valid(&mut self.users)?;
        retain_valid(&mut self.roles)?;
        retain_valid(&mut self.settings)?;

        let mut report = RemovalReport::default();
        let mut orphaned = Vec::new();
        for (target, comment) in &self.comments {
            let live = {
                let guard = lock(comment)?;
                guard.is_valid() && guard.target_is_live()?
            };
            if !live {
                orphaned.push(*target);
            }
        }
        for target in orphaned {
            if let Some(comment) = self.comments.remove(&target) {
                let comment: ObjectRef = comment;
                if lock(&comment)?.is_valid() {
                    report.merge(remove_cascade(&comment, session)?);
                }
            }
        }
        Ok(report)
    }

    // ---------- enumeration ----------

    /// Objects of one kind as metadata queries see them: hidden objects are
    /// left out.
    pub fn list_objects(&self, kind: ObjectKind) -> CatalogResult<Vec<ObjectRef>> {
        let objects: Vec<ObjectRef> = match kind {
            ObjectKind::Schema => self.schemas.values().map(|s| s.clone() as ObjectRef).collect(),
            ObjectKind::User => self.users.values().map(|u| u.clone() as ObjectRef).collect(),
            ObjectKind::Role => self.roles.values().map(|r| r.clone() as ObjectRef).collect(),
            ObjectKind::Setting => self.settings.values().map(|s| s.clone() as ObjectRef).collect(),
            ObjectKind::Comment => self.comments.values().map(|c| c.clone() as ObjectRef).collect(),
            kind if kind.is_schema_bound() => {
                let mut objects = Vec::new();
                for schema in self.schemas.values() {
                    let entries = lock(schema)?.entries(kind);
                    for entry in entries {
                        let object = entry.object();
                        if !is_hidden(&object)? {
                            objects.push(object);
                        }
                    }
                }
                objects
            }
            _ => Vec::new(),
        };
        Ok(objects)
    }

    /// Statements that rebuild the persistent catalog, owners before the
    /// objects that depend on them.
    pub fn script(&self) -> CatalogResult<Vec<String>> {
        let mut out = Vec::new();
        for setting in self.settings.values() {
            out.push(lock(setting)?.create_sql()?);
        }
        for user in self.users.values() {
            out.push(lock(user)?.create_sql()?);
        }
        for role in self.roles.values() {
            let role = lock(role)?;
            if !role.is_system() {
                out.push(role.create_sql()?);
            }
        }
        for (name, schema) in &self.schemas {
            if !self.config.system_schemas.contains(name) {
                out.push(lock(schema)?.create_sql()?);
            }
        }
        for schema in self.schemas.values() {
            for kind in SCRIPT_ORDER {
                let entries = lock(schema)?.entries(kind);
                for entry in entries {
                    let object = entry.object();
                    let object = lock(&object)?;
                    let hidden = object.as_schema_object().is_some_and(|o| o.is_hidden());
                    if !hidden && !object.is_temporary()? {
                        out.push(object.create_sql()?);
                    }
                }
            }
        }
        for comment in self.comments.values() {
            let comment = lock(comment)?;
            if comment.target_is_scripted()? {
                out.push(comment.create_sql()?);
            }
        }
        Ok(out)
    }
}

fn not_found(kind: ObjectKind, name: &str) -> CatalogError {
    CatalogError::NotFound {
        kind,
        name: name.to_string(),
    }
}

fn duplicate(kind: ObjectKind, name: &str) -> CatalogError {
    CatalogError::DuplicateName {
        kind,
        name: name.to_string(),
    }
}

fn ensure_free(schema: &SchemaRef, kind: ObjectKind, name: &str) -> CatalogResult<()> {
    if lock(schema)?.contains(kind, name) {
        return Err(duplicate(kind, name));
    }
    Ok(())
}

fn in_use(kind: ObjectKind, name: &str, by: String) -> CatalogError {
    CatalogError::InUse {
        kind,
        name: name.to_string(),
        by,
    }
}

/// Name of a live constraint backed by the index `name`, owned or reused.
fn constraint_using_index(schema: &SchemaRef, name: &str) -> CatalogResult<Option<String>> {
    let (index, constraints) = {
        let schema = lock(schema)?;
        (schema.index(name), schema.entries(ObjectKind::Constraint))
    };
    let Some(index) = index else {
        return Ok(None);
    };
    for entry in constraints {
        let SchemaEntry::Constraint(constraint) = entry else {
            continue;
        };
        let guard = lock(&constraint)?;
        if guard.is_valid() && guard.index().is_some_and(|i| Arc::ptr_eq(&i, &index)) {
            return Ok(Some(guard.name()?.to_string()));
        }
    }
    Ok(None)
}

fn is_hidden(object: &ObjectRef) -> CatalogResult<bool> {
    Ok(lock(object)?
        .as_schema_object()
        .is_some_and(|o| o.is_hidden()))
}

fn checked_columns(table: &TableRef, columns: &[&str]) -> CatalogResult<Vec<String>> {
    let table = lock(table)?;
    columns
        .iter()
        .map(|c| {
            table
                .column_by_name(c)
                .map(|meta| meta.name.clone())
                .ok_or_else(|| not_found(ObjectKind::TableOrView, &format!("{}.{c}", table.name().unwrap_or("?"))))
        })
        .collect()
}

fn find_covering_index(schema: &SchemaRef, table: &TableRef, columns: &[String]) -> CatalogResult<Option<IndexRef>> {
    let candidates = lock(schema)?.entries(ObjectKind::Index);
    for entry in candidates {
        let SchemaEntry::Index(index) = entry else {
            continue;
        };
        let guard = lock(&index)?;
        if guard.is_unique() && guard.covers(columns) && Arc::ptr_eq(&guard.table()?, table) {
            drop(guard);
            return Ok(Some(index));
        }
    }
    Ok(None)
}

fn rekey<T: ?Sized>(map: &mut BTreeMap<String, Arc<Mutex<T>>>, old: &str, new: &str) {
    if let Some(object) = map.remove(old) {
        map.insert(new.to_string(), object);
    }
}

fn retain_valid<K: Ord + Clone, T: CatalogObject + ?Sized>(map: &mut BTreeMap<K, Arc<Mutex<T>>>) -> CatalogResult<()> {
    let mut gone = Vec::new();
    for (key, object) in map.iter() {
        if !lock(object)?.is_valid() {
            gone.push(key.clone());
        }
    }
    for key in gone {
        map.remove(&key);
    }
    Ok(())
}
