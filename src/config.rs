//! Catalog configuration.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Name used in trace output.
    pub database_name: String,

    /// First id handed out by the database.
    pub first_object_id: i32,

    /// Modification counter value of a fresh database.
    pub initial_version: u64,

    /// Schema created together with the catalog.
    pub main_schema: String,

    /// Schemas that exist from the start and can be neither renamed nor
    /// dropped.
    pub system_schemas: Vec<String>,

    /// Administrator created together with the catalog.
    pub system_user: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_name: "HELIUM".into(),
            first_object_id: 0,
            initial_version: 0,
            main_schema: "PUBLIC".into(),
            system_schemas: vec!["INFORMATION_SCHEMA".into()],
            system_user: "SA".into(),
        }
    }
}

impl CatalogConfig {
    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = name.into();
        self
    }

    pub fn with_first_object_id(mut self, id: i32) -> Self {
        self.first_object_id = id;
        self
    }

    pub fn with_initial_version(mut self, version: u64) -> Self {
        self.initial_version = version;
        self
    }

    pub fn with_main_schema(mut self, name: impl Into<String>) -> Self {
        self.main_schema = name.into();
        self
    }

    pub fn with_system_user(mut self, name: impl Into<String>) -> Self {
        self.system_user = name.into();
        self
    }

    pub fn is_system_schema(&self, name: &str) -> bool {
        name == self.main_schema || self.system_schemas.iter().any(|s| s == name)
    }
}
