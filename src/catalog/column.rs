use std::fmt::Write;

use crate::catalog::quote::push_identifier;
use crate::types::datatype::DataType;

/// Ordinal of a column inside its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(pub u32);

/// Column as requested by `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    /// Values come from a table-owned sequence.
    pub identity: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            identity: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self.nullable = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub id: ColumnId,
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub identity: bool,
}

impl ColumnMeta {
    pub fn from_def(id: ColumnId, def: ColumnDef) -> Self {
        Self {
            id,
            name: def.name,
            data_type: def.data_type,
            nullable: def.nullable,
            identity: def.identity,
        }
    }

    /// Column definition as it appears inside `CREATE TABLE (...)`.
    pub fn push_sql(&self, out: &mut String, always_quote: bool) {
        push_identifier(out, &self.name, always_quote);
        let _ = write!(out, " {}", self.data_type);
        if self.identity {
            out.push_str(" GENERATED BY DEFAULT AS IDENTITY");
        }
        if !self.nullable {
            out.push_str(" NOT NULL");
        }
    }
}
