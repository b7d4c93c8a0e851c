//! Users and roles. Both live at database level, outside any schema.

use std::sync::{Arc, Mutex};

use crate::catalog::database::Database;
use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::CatalogObjectId;
use crate::catalog::kind::ObjectKind;
use crate::catalog::object::{CatalogObject, ObjectBase};
use crate::catalog::session::Session;

pub type UserRef = Arc<Mutex<User>>;
pub type RoleRef = Arc<Mutex<Role>>;

pub const PUBLIC_ROLE: &str = "PUBLIC";

#[derive(Debug)]
pub struct User {
    base: ObjectBase,
    admin: bool,
    system: bool,
}

impl User {
    pub fn new(database: &Arc<Database>, id: CatalogObjectId, name: impl Into<String>, admin: bool) -> Self {
        Self {
            base: ObjectBase::new(database, id, name, ObjectKind::User),
            admin,
            system: false,
        }
    }

    /// The administrator created with the database.
    pub fn system(mut self) -> Self {
        self.system = true;
        self.admin = true;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn is_system(&self) -> bool {
        self.system
    }
}

impl CatalogObject for User {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    /// Credentials are never part of the script.
    fn create_sql(&self) -> CatalogResult<String> {
        let mut sql = format!("CREATE USER IF NOT EXISTS {} PASSWORD ''", self.render_name(true)?);
        if self.admin {
            sql.push_str(" ADMIN");
        }
        Ok(sql)
    }

    fn drop_sql(&self) -> CatalogResult<String> {
        Ok(format!("DROP USER {}", self.render_name(true)?))
    }

    fn remove_children_and_resources(&mut self, _session: &mut dyn Session) -> CatalogResult<()> {
        Ok(())
    }

    fn check_rename(&self) -> CatalogResult<()> {
        if self.system {
            return Err(CatalogError::rename_not_allowed(
                ObjectKind::User,
                self.name()?,
                "system user",
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Role {
    base: ObjectBase,
    system: bool,
}

impl Role {
    pub fn new(database: &Arc<Database>, id: CatalogObjectId, name: impl Into<String>, system: bool) -> Self {
        Self {
            base: ObjectBase::new(database, id, name, ObjectKind::Role),
            system,
        }
    }

    pub fn is_system(&self) -> bool {
        self.system
    }
}

impl CatalogObject for Role {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn create_sql(&self) -> CatalogResult<String> {
        Ok(format!("CREATE ROLE IF NOT EXISTS {}", self.render_name(true)?))
    }

    fn drop_sql(&self) -> CatalogResult<String> {
        Ok(format!("DROP ROLE {}", self.render_name(true)?))
    }

    fn remove_children_and_resources(&mut self, _session: &mut dyn Session) -> CatalogResult<()> {
        Ok(())
    }

    fn check_rename(&self) -> CatalogResult<()> {
        if self.system {
            return Err(CatalogError::rename_not_allowed(
                ObjectKind::Role,
                self.name()?,
                "system role",
            ));
        }
        Ok(())
    }
}
