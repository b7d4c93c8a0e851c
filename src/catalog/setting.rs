use std::fmt;
use std::sync::{Arc, Mutex};

use crate::catalog::database::Database;
use crate::catalog::errors::{CatalogError, CatalogResult};
use crate::catalog::ids::CatalogObjectId;
use crate::catalog::kind::ObjectKind;
use crate::catalog::object::{CatalogObject, ObjectBase};
use crate::catalog::quote::quote_string;
use crate::catalog::session::Session;

pub type SettingRef = Arc<Mutex<Setting>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Int(v) => write!(f, "{v}"),
            SettingValue::Text(s) => f.write_str(&quote_string(s)),
        }
    }
}

/// A persistent database setting. Settings have fixed names.
#[derive(Debug)]
pub struct Setting {
    base: ObjectBase,
    value: SettingValue,
}

impl Setting {
    pub fn new(database: &Arc<Database>, id: CatalogObjectId, name: impl Into<String>, value: SettingValue) -> Self {
        Self {
            base: ObjectBase::new(database, id, name, ObjectKind::Setting),
            value,
        }
    }

    pub fn value(&self) -> &SettingValue {
        &self.value
    }

    pub fn set_value(&mut self, value: SettingValue) -> CatalogResult<()> {
        if self.value != value {
            self.base.mark_modified()?;
            self.value = value;
        }
        Ok(())
    }
}

impl CatalogObject for Setting {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn create_sql(&self) -> CatalogResult<String> {
        Ok(format!("SET {} {}", self.name()?, self.value))
    }

    fn drop_sql(&self) -> CatalogResult<String> {
        Err(CatalogError::Unsupported {
            kind: ObjectKind::Setting,
            operation: "drop",
        })
    }

    fn remove_children_and_resources(&mut self, _session: &mut dyn Session) -> CatalogResult<()> {
        Ok(())
    }

    fn check_rename(&self) -> CatalogResult<()> {
        Err(CatalogError::rename_not_allowed(
            ObjectKind::Setting,
            self.name()?,
            "settings have fixed names",
        ))
    }
}
