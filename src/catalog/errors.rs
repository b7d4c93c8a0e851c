use crate::catalog::ids::{CatalogObjectId, ResourceId};
use crate::catalog::kind::ObjectKind;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CatalogError {
    // ----------------------------
    // User-facing
    // ----------------------------
    #[error("cannot rename {kind} '{name}': {reason}")]
    RenameNotAllowed {
        kind: ObjectKind,
        name: String,
        reason: &'static str,
    },

    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: ObjectKind, name: String },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: ObjectKind, name: String },

    #[error("{kind} '{name}' is still used by {by}")]
    InUse {
        kind: ObjectKind,
        name: String,
        by: String,
    },

    #[error("invalid {kind} '{name}': {reason}")]
    InvalidValue {
        kind: ObjectKind,
        name: String,
        reason: &'static str,
    },

    #[error("sequence '{name}' has no values left")]
    SequenceExhausted { name: String },

    #[error("{operation} is not supported for {kind}")]
    Unsupported {
        kind: ObjectKind,
        operation: &'static str,
    },

    // ----------------------------
    // Resource release
    // ----------------------------
    #[error("resource {resource:?} of object {owner} is busy")]
    ResourceBusy {
        owner: CatalogObjectId,
        resource: ResourceId,
    },

    #[error("resource {resource:?} is not allocated")]
    UnknownResource { resource: ResourceId },

    // ----------------------------
    // Internal consistency
    // ----------------------------
    #[error("internal error: {kind} {id} was already invalidated")]
    AlreadyInvalidated { kind: ObjectKind, id: CatalogObjectId },

    #[error("internal error: {kind} object used after invalidation")]
    Invalidated { kind: ObjectKind },

    #[error("internal error: {parent} lists child {kind} '{child}' that was already invalidated")]
    UnknownChildState {
        parent: CatalogObjectId,
        kind: ObjectKind,
        child: String,
    },

    #[error("internal error: dependency cycle through object {id}")]
    DependencyCycle { id: CatalogObjectId },

    #[error("internal error: database is closed")]
    DatabaseClosed,

    #[error("internal error: object id space exhausted")]
    IdSpaceExhausted,

    #[error("internal error: unknown object kind tag {tag}")]
    UnknownKind { tag: u8 },

    #[error("internal error: lock on {what} poisoned")]
    Poisoned { what: &'static str },
}

impl CatalogError {
    pub fn rename_not_allowed(kind: ObjectKind, name: impl Into<String>, reason: &'static str) -> Self {
        CatalogError::RenameNotAllowed {
            kind,
            name: name.into(),
            reason,
        }
    }

    /// True for errors that indicate a broken catalog rather than a bad
    /// statement.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            CatalogError::AlreadyInvalidated { .. }
                | CatalogError::Invalidated { .. }
                | CatalogError::UnknownChildState { .. }
                | CatalogError::DependencyCycle { .. }
                | CatalogError::DatabaseClosed
                | CatalogError::IdSpaceExhausted
                | CatalogError::UnknownKind { .. }
                | CatalogError::Poisoned { .. }
        )
    }
}
