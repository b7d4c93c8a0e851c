use std::fmt;

use crate::catalog::errors::CatalogError;
use crate::catalog::trace::TraceModule;

/// Type tag of a catalog object.
///
/// The discriminants are stable and are used by the registry to classify
/// entries for listing and type-specific dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ObjectKind {
    TableOrView = 0,
    Index = 1,
    User = 2,
    Sequence = 3,
    Trigger = 4,
    /// Check, unique or referential constraint.
    Constraint = 5,
    Setting = 6,
    Role = 7,
    Right = 8,
    FunctionAlias = 9,
    Schema = 10,
    Constant = 11,
    Domain = 12,
    Comment = 13,
    /// User-defined aggregate function.
    Aggregate = 14,
    Synonym = 15,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 16] = [
        ObjectKind::TableOrView,
        ObjectKind::Index,
        ObjectKind::User,
        ObjectKind::Sequence,
        ObjectKind::Trigger,
        ObjectKind::Constraint,
        ObjectKind::Setting,
        ObjectKind::Role,
        ObjectKind::Right,
        ObjectKind::FunctionAlias,
        ObjectKind::Schema,
        ObjectKind::Constant,
        ObjectKind::Domain,
        ObjectKind::Comment,
        ObjectKind::Aggregate,
        ObjectKind::Synonym,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Keyword used for this kind in `COMMENT ON` and error messages.
    pub fn keyword(self) -> &'static str {
        match self {
            ObjectKind::TableOrView => "TABLE",
            ObjectKind::Index => "INDEX",
            ObjectKind::User => "USER",
            ObjectKind::Sequence => "SEQUENCE",
            ObjectKind::Trigger => "TRIGGER",
            ObjectKind::Constraint => "CONSTRAINT",
            ObjectKind::Setting => "SETTING",
            ObjectKind::Role => "ROLE",
            ObjectKind::Right => "RIGHT",
            ObjectKind::FunctionAlias => "ALIAS",
            ObjectKind::Schema => "SCHEMA",
            ObjectKind::Constant => "CONSTANT",
            ObjectKind::Domain => "DOMAIN",
            ObjectKind::Comment => "COMMENT",
            ObjectKind::Aggregate => "AGGREGATE",
            ObjectKind::Synonym => "SYNONYM",
        }
    }

    /// Whether objects of this kind live inside a schema namespace.
    pub fn is_schema_bound(self) -> bool {
        matches!(
            self,
            ObjectKind::TableOrView
                | ObjectKind::Index
                | ObjectKind::Sequence
                | ObjectKind::Trigger
                | ObjectKind::Constraint
                | ObjectKind::FunctionAlias
                | ObjectKind::Constant
                | ObjectKind::Domain
                | ObjectKind::Aggregate
                | ObjectKind::Synonym
        )
    }

    pub fn trace_module(self) -> TraceModule {
        match self {
            ObjectKind::TableOrView | ObjectKind::Constraint | ObjectKind::Domain => {
                TraceModule::Table
            }
            ObjectKind::Index => TraceModule::Index,
            ObjectKind::Sequence => TraceModule::Sequence,
            ObjectKind::Trigger => TraceModule::Trigger,
            ObjectKind::User | ObjectKind::Role | ObjectKind::Right => TraceModule::User,
            ObjectKind::Schema
            | ObjectKind::Constant
            | ObjectKind::Synonym
            | ObjectKind::FunctionAlias
            | ObjectKind::Aggregate => TraceModule::Schema,
            ObjectKind::Setting | ObjectKind::Comment => TraceModule::Database,
        }
    }
}

impl TryFrom<u8> for ObjectKind {
    type Error = CatalogError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        ObjectKind::ALL
            .get(tag as usize)
            .copied()
            .ok_or(CatalogError::UnknownKind { tag })
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
