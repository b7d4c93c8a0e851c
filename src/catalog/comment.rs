use std::sync::{Arc, Mutex, Weak};

use crate::catalog::database::Database;
use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::CatalogObjectId;
use crate::catalog::kind::ObjectKind;
use crate::catalog::object::{CatalogObject, ObjectBase, ObjectRef, lock};
use crate::catalog::quote::quote_string;
use crate::catalog::session::Session;

pub type CommentRef = Arc<Mutex<Comment>>;

/// Persisted `COMMENT ON` for another object. The target's name is looked
/// up when SQL is generated, so renames of the target carry over.
pub struct Comment {
    base: ObjectBase,
    target: Weak<Mutex<dyn CatalogObject>>,
    target_kind: ObjectKind,
    target_id: CatalogObjectId,
    text: Option<String>,
}

impl Comment {
    pub fn new(
        database: &Arc<Database>,
        id: CatalogObjectId,
        target: &ObjectRef,
        target_kind: ObjectKind,
        target_id: CatalogObjectId,
        text: Option<String>,
    ) -> Self {
        Self {
            base: ObjectBase::new(database, id, format!("{target_kind} {}", target_id.0), ObjectKind::Comment),
            target: Arc::downgrade(target),
            target_kind,
            target_id,
            text,
        }
    }

    pub fn target_id(&self) -> CatalogObjectId {
        self.target_id
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: Option<String>) -> CatalogResult<()> {
        self.base.mark_modified()?;
        self.text = text;
        Ok(())
    }

    /// False once the commented object is gone or invalidated.
    pub fn target_is_live(&self) -> CatalogResult<bool> {
        match self.target.upgrade() {
            Some(target) => Ok(lock(&target)?.is_valid()),
            None => Ok(false),
        }
    }

    /// Comments on hidden or temporary objects stay out of scripts.
    pub fn target_is_scripted(&self) -> CatalogResult<bool> {
        let Some(target) = self.target.upgrade() else {
            return Ok(false);
        };
        let target = lock(&target)?;
        if !target.is_valid() || target.is_temporary()? {
            return Ok(false);
        }
        Ok(!target.as_schema_object().is_some_and(|o| o.is_hidden()))
    }

    fn target_sql(&self) -> CatalogResult<String> {
        let target = self.target.upgrade().ok_or(CatalogError::NotFound {
            kind: self.target_kind,
            name: format!("commented object {}", self.target_id),
        })?;
        let target = lock(&target)?;
        match target.as_schema_object() {
            Some(object) => object.qualified_name(true),
            None => target.render_name(true),
        }
    }

    fn push_prefix(&self, sql: &mut String) -> CatalogResult<()> {
        sql.push_str("COMMENT ON ");
        sql.push_str(self.target_kind.keyword());
        sql.push(' ');
        sql.push_str(&self.target_sql()?);
        sql.push_str(" IS ");
        Ok(())
    }
}

impl CatalogObject for Comment {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn create_sql(&self) -> CatalogResult<String> {
        let mut sql = String::new();
        self.push_prefix(&mut sql)?;
        match &self.text {
            Some(text) => sql.push_str(&quote_string(text)),
            None => sql.push_str("NULL"),
        }
        Ok(sql)
    }

    fn drop_sql(&self) -> CatalogResult<String> {
        let mut sql = String::new();
        self.push_prefix(&mut sql)?;
        sql.push_str("NULL");
        Ok(sql)
    }

    fn remove_children_and_resources(&mut self, _session: &mut dyn Session) -> CatalogResult<()> {
        Ok(())
    }

    fn check_rename(&self) -> CatalogResult<()> {
        Err(CatalogError::rename_not_allowed(
            ObjectKind::Comment,
            self.name()?,
            "comments are named after their target",
        ))
    }
}
