//! The capability every catalog entry implements, and the shared
//! bookkeeping behind it.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::catalog::database::Database;
use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::{CatalogObjectId, ModificationVersion};
use crate::catalog::kind::ObjectKind;
use crate::catalog::quote::quote_identifier;
use crate::catalog::schema_object::SchemaObject;
use crate::catalog::session::Session;
use crate::catalog::trace::Trace;

/// Shared handle to a catalog object.
pub type ObjectRef = Arc<Mutex<dyn CatalogObject>>;

pub fn lock<T: ?Sized>(object: &Mutex<T>) -> CatalogResult<MutexGuard<'_, T>> {
    object
        .lock()
        .map_err(|_| CatalogError::Poisoned { what: "catalog object" })
}

/// Fields that exist only while the object is valid.
#[derive(Debug)]
struct LiveState {
    name: String,
    database: Weak<Database>,
    trace: Trace,
    modification: ModificationVersion,
    temporary: bool,
    comment: Option<String>,
}

/// Bookkeeping shared by all object kinds: identity, name, modification
/// version, temporary flag and comment.
///
/// Once [`invalidate`](ObjectBase::invalidate) has run only the id (now
/// [`CatalogObjectId::INVALID`]) can be read; every other accessor fails with
/// [`CatalogError::Invalidated`].
#[derive(Debug)]
pub struct ObjectBase {
    kind: ObjectKind,
    id: CatalogObjectId,
    live: Option<LiveState>,
}

impl ObjectBase {
    pub fn new(database: &Arc<Database>, id: CatalogObjectId, name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            kind,
            id,
            live: Some(LiveState {
                name: name.into(),
                database: Arc::downgrade(database),
                trace: database.trace(kind.trace_module()),
                modification: database.current_version(),
                temporary: false,
                comment: None,
            }),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn id(&self) -> CatalogObjectId {
        self.id
    }

    pub fn is_valid(&self) -> bool {
        self.id.is_valid()
    }

    fn live(&self) -> CatalogResult<&LiveState> {
        self.live
            .as_ref()
            .ok_or(CatalogError::Invalidated { kind: self.kind })
    }

    fn live_mut(&mut self) -> CatalogResult<&mut LiveState> {
        self.live
            .as_mut()
            .ok_or(CatalogError::Invalidated { kind: self.kind })
    }

    pub fn name(&self) -> CatalogResult<&str> {
        Ok(&self.live()?.name)
    }

    pub fn database(&self) -> CatalogResult<Arc<Database>> {
        self.live()?
            .database
            .upgrade()
            .ok_or(CatalogError::DatabaseClosed)
    }

    pub fn trace(&self) -> CatalogResult<&Trace> {
        Ok(&self.live()?.trace)
    }

    pub fn modification_version(&self) -> CatalogResult<ModificationVersion> {
        Ok(self.live()?.modification)
    }

    fn next_version(&self) -> CatalogResult<ModificationVersion> {
        Ok(self.database()?.advance_version())
    }

    /// Records a structural change. Every mutator must go through here.
    pub fn mark_modified(&mut self) -> CatalogResult<()> {
        let version = self.next_version()?;
        self.live_mut()?.modification = version;
        Ok(())
    }

    pub fn render_name(&self, always_quote: bool) -> CatalogResult<String> {
        Ok(quote_identifier(self.name()?, always_quote))
    }

    /// Changes the name without any eligibility check. Name and version move
    /// together or not at all.
    pub fn set_name(&mut self, name: impl Into<String>) -> CatalogResult<()> {
        let version = self.next_version()?;
        let live = self.live_mut()?;
        live.name = name.into();
        live.modification = version;
        Ok(())
    }

    pub fn is_temporary(&self) -> CatalogResult<bool> {
        Ok(self.live()?.temporary)
    }

    /// Temporary objects never reach persisted scripts, so the flag itself
    /// is not versioned.
    pub fn set_temporary(&mut self, temporary: bool) -> CatalogResult<()> {
        self.live_mut()?.temporary = temporary;
        Ok(())
    }

    pub fn comment(&self) -> CatalogResult<Option<&str>> {
        Ok(self.live()?.comment.as_deref())
    }

    /// Comments on persistent objects are part of the catalog script and
    /// advance the version like a rename; comments on temporary objects do
    /// not.
    pub fn set_comment(&mut self, comment: Option<String>) -> CatalogResult<()> {
        let version = if self.is_temporary()? {
            None
        } else {
            Some(self.next_version()?)
        };
        let live = self.live_mut()?;
        live.comment = comment;
        if let Some(version) = version {
            live.modification = version;
        }
        Ok(())
    }

    /// Terminal transition. Clears every field so later use fails loudly.
    pub fn invalidate(&mut self) -> CatalogResult<()> {
        if !self.is_valid() {
            tracing::error!(kind = %self.kind, "invalidate called on an invalidated object");
            return Err(CatalogError::AlreadyInvalidated {
                kind: self.kind,
                id: self.id,
            });
        }
        self.mark_modified()?;
        if let Some(live) = &self.live {
            live.trace
                .debug(format_args!("invalidate {} {} {}", self.kind, live.name, self.id));
        }
        self.id = CatalogObjectId::INVALID;
        self.live = None;
        Ok(())
    }
}

impl fmt::Display for ObjectBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.live {
            Some(live) => write!(f, "{}:{}:{}", live.name, self.id.0, self.kind),
            None => write!(f, "<invalid>:{}:{}", self.id.0, self.kind),
        }
    }
}

/// Uniform interface over every kind of catalog entry.
///
/// Concrete kinds embed an [`ObjectBase`] and supply the kind-specific SQL
/// text, dependents and resource release.
pub trait CatalogObject: Send {
    fn base(&self) -> &ObjectBase;

    fn base_mut(&mut self) -> &mut ObjectBase;

    fn kind(&self) -> ObjectKind {
        self.base().kind()
    }

    fn id(&self) -> CatalogObjectId {
        self.base().id()
    }

    fn is_valid(&self) -> bool {
        self.base().is_valid()
    }

    fn name(&self) -> CatalogResult<&str> {
        self.base().name()
    }

    fn modification_version(&self) -> CatalogResult<ModificationVersion> {
        self.base().modification_version()
    }

    /// Identifier as it appears in SQL text.
    fn render_name(&self, always_quote: bool) -> CatalogResult<String> {
        self.base().render_name(always_quote)
    }

    /// Objects that structurally depend on this one, in the order they must
    /// be removed. Computed on every call.
    fn children(&self) -> Vec<ObjectRef> {
        Vec::new()
    }

    /// Statement that recreates this object in an empty catalog.
    fn create_sql(&self) -> CatalogResult<String>;

    /// Statement that creates an equivalent object bound to `table` under
    /// `quoted_name`.
    fn create_sql_for_copy(&self, table: &dyn CatalogObject, quoted_name: &str) -> CatalogResult<String> {
        let _ = (table, quoted_name);
        Err(CatalogError::Unsupported {
            kind: self.kind(),
            operation: "create for copy",
        })
    }

    fn drop_sql(&self) -> CatalogResult<String>;

    /// Releases non-catalog resources and detaches this object from its
    /// owners. Dependents have already been removed when this runs.
    fn remove_children_and_resources(&mut self, session: &mut dyn Session) -> CatalogResult<()>;

    /// Succeeds silently when a rename is allowed.
    fn check_rename(&self) -> CatalogResult<()>;

    fn rename(&mut self, new_name: &str) -> CatalogResult<()> {
        self.check_rename()?;
        let old = self.name()?.to_string();
        self.base_mut().set_name(new_name)?;
        self.base()
            .trace()?
            .debug(format_args!("rename {} {} -> {}", self.kind(), old, new_name));
        Ok(())
    }

    fn is_temporary(&self) -> CatalogResult<bool> {
        self.base().is_temporary()
    }

    fn set_temporary(&mut self, temporary: bool) -> CatalogResult<()> {
        self.base_mut().set_temporary(temporary)
    }

    fn comment(&self) -> CatalogResult<Option<&str>> {
        self.base().comment()
    }

    fn set_comment(&mut self, comment: Option<String>) -> CatalogResult<()> {
        self.base_mut().set_comment(comment)
    }

    fn as_schema_object(&self) -> Option<&dyn SchemaObject> {
        None
    }
}

/// Strong references from an owner to its dependents, keyed by id so an
/// owner can drop an entry while the dependent itself is locked.
#[derive(Default)]
pub struct Dependents {
    entries: Vec<(CatalogObjectId, ObjectRef)>,
}

impl Dependents {
    pub fn push(&mut self, id: CatalogObjectId, object: ObjectRef) {
        self.entries.push((id, object));
    }

    pub fn remove(&mut self, id: CatalogObjectId) -> Option<ObjectRef> {
        let pos = self.entries.iter().position(|(e, _)| *e == id)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains(&self, id: CatalogObjectId) -> bool {
        self.entries.iter().any(|(e, _)| *e == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn refs(&self) -> impl Iterator<Item = ObjectRef> + '_ {
        self.entries.iter().map(|(_, o)| Arc::clone(o))
    }
}

impl fmt::Debug for Dependents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(id, _)| id))
            .finish()
    }
}
