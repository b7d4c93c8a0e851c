//! Cascading removal.
//!
//! Tears down an object after everything that depends on it. The walk keeps
//! an explicit stack and asks each object for its children every time it is
//! on top, because removing one child changes what its siblings and parent
//! report.
//!
//! Failure stops the walk where it is. Objects removed so far stay removed;
//! the failing object, its ancestors and unvisited siblings stay valid. The
//! enclosing transaction decides whether to roll back.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::instrument;

use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::CatalogObjectId;
use crate::catalog::kind::ObjectKind;
use crate::catalog::object::{ObjectRef, lock};
use crate::catalog::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedObject {
    pub id: CatalogObjectId,
    pub kind: ObjectKind,
    pub name: String,
}

/// Objects removed by one cascade, in removal order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    pub removed: Vec<RemovedObject>,
}

impl RemovalReport {
    pub fn len(&self) -> usize {
        self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.removed.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn contains(&self, id: CatalogObjectId) -> bool {
        self.removed.iter().any(|r| r.id == id)
    }

    pub fn merge(&mut self, other: RemovalReport) {
        self.removed.extend(other.removed);
    }
}

struct Frame {
    object: ObjectRef,
    id: CatalogObjectId,
}

/// Removes `target` and, first, everything that depends on it.
#[instrument(name = "catalog::remove_cascade", level = "debug", skip_all)]
pub fn remove_cascade(target: &ObjectRef, session: &mut dyn Session) -> CatalogResult<RemovalReport> {
    let id = {
        let guard = lock(target)?;
        if !guard.is_valid() {
            return Err(CatalogError::AlreadyInvalidated {
                kind: guard.kind(),
                id: guard.id(),
            });
        }
        guard.id()
    };

    let mut report = RemovalReport::default();
    let mut on_stack = HashSet::from([id]);
    let mut stack = vec![Frame {
        object: Arc::clone(target),
        id,
    }];

    while let Some(top) = stack.last() {
        let parent = top.id;
        let children = lock(&top.object)?.children();

        match first_pending_child(parent, &children)? {
            Some((child, child_id)) => {
                if !on_stack.insert(child_id) {
                    return Err(CatalogError::DependencyCycle { id: child_id });
                }
                stack.push(Frame {
                    object: child,
                    id: child_id,
                });
            }
            None => {
                let Some(frame) = stack.pop() else { break };
                on_stack.remove(&frame.id);
                report.removed.push(remove_one(&frame.object, session)?);
            }
        }
    }

    tracing::debug!(count = report.len(), "cascade finished");
    Ok(report)
}

/// A live child list never contains invalidated objects; one that does
/// points at a dangling catalog entry.
fn first_pending_child(
    parent: CatalogObjectId,
    children: &[ObjectRef],
) -> CatalogResult<Option<(ObjectRef, CatalogObjectId)>> {
    let Some(child) = children.first() else {
        return Ok(None);
    };
    let guard = lock(child)?;
    if !guard.is_valid() {
        return Err(CatalogError::UnknownChildState {
            parent,
            kind: guard.kind(),
            child: guard.base().to_string(),
        });
    }
    let id = guard.id();
    drop(guard);
    Ok(Some((Arc::clone(child), id)))
}

fn remove_one(object: &ObjectRef, session: &mut dyn Session) -> CatalogResult<RemovedObject> {
    let mut guard = lock(object)?;
    let removed = RemovedObject {
        id: guard.id(),
        kind: guard.kind(),
        name: guard.name()?.to_string(),
    };

    guard.remove_children_and_resources(session)?;
    guard.base_mut().invalidate()?;

    tracing::debug!(kind = %removed.kind, name = %removed.name, id = removed.id.0, "removed");
    Ok(removed)
}
