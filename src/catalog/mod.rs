pub mod cascade;
pub mod catalog;
pub mod column;
pub mod comment;
pub mod constraint;
pub mod database;
pub mod errors;
pub mod ids;
pub mod index;
pub mod kind;
pub mod object;
pub mod quote;
pub mod schema;
pub mod schema_object;
pub mod sequence;
pub mod session;
pub mod setting;
pub mod table;
pub mod trace;
pub mod trigger;
pub mod unit_tests;
pub mod user;

pub use catalog::Catalog;
pub use errors::{CatalogError, CatalogResult};
pub use object::{CatalogObject, ObjectRef};
