use anyhow::Context;

use helium_catalog::catalog::Catalog;
use helium_catalog::catalog::constraint::ConstraintType;
use helium_catalog::catalog::kind::ObjectKind;
use helium_catalog::catalog::object::{ObjectRef, lock};
use helium_catalog::catalog::session::MemorySession;
use helium_catalog::config::CatalogConfig;

use super::data::{customer_columns, order_columns};

pub struct TestCatalog {
    pub catalog: Catalog,
    pub session: MemorySession,
}

#[allow(dead_code)]
impl TestCatalog {
    pub fn new() -> Self {
        super::init_tracing_for_tests();
        let config = CatalogConfig::default().with_database_name(format!("TEST_{}", rand::random::<u32>()));
        Self {
            catalog: Catalog::new(config).unwrap(),
            session: MemorySession::new(1),
        }
    }

    /// `CUSTOMERS` with an identity column and a primary key, `ORDERS`
    /// with a secondary index, both in `PUBLIC`.
    pub fn with_shop() -> Self {
        let mut db = Self::new();
        db.catalog
            .create_table(&mut db.session, "PUBLIC", "CUSTOMERS", customer_columns(), false)
            .unwrap();
        db.catalog
            .add_constraint(
                &mut db.session,
                "PUBLIC",
                "CUSTOMERS",
                "PK_CUSTOMERS",
                ConstraintType::PrimaryKey {
                    columns: vec!["ID".into()],
                },
            )
            .unwrap();
        db.catalog
            .create_table(&mut db.session, "PUBLIC", "ORDERS", order_columns(), false)
            .unwrap();
        db.catalog
            .create_index(&mut db.session, "PUBLIC", "ORDERS", "IDX_ORDERS_CUSTOMER", &["CUSTOMER_ID"], false)
            .unwrap();
        db
    }

    pub fn find(&self, kind: ObjectKind, name: &str) -> anyhow::Result<ObjectRef> {
        self.catalog
            .find(kind, None, name)
            .with_context(|| format!("looking up {kind} {name}"))
    }

    pub fn is_valid(object: &ObjectRef) -> bool {
        lock(object).map(|o| o.is_valid()).unwrap_or(false)
    }

    /// Visible names of one kind, as metadata queries list them.
    pub fn names(&self, kind: ObjectKind) -> Vec<String> {
        self.catalog
            .list_objects(kind)
            .unwrap()
            .iter()
            .map(|o| lock(o).unwrap().name().unwrap().to_string())
            .collect()
    }

    pub fn script(&self) -> Vec<String> {
        self.catalog.script().unwrap()
    }
}
