//! Column types known to the catalog.

pub mod datatype;
