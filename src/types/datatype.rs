//! Logical column types as they appear in catalog DDL.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DataType {
    // Integer types
    Int32,
    Int64,

    // Floating point
    Float32,
    Float64,

    Boolean,

    Varchar { max_len: Option<u32> },

    Date,
    Timestamp,

    Blob,
}

impl DataType {
    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Int32 | DataType::Int64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int32 => write!(f, "INT"),
            DataType::Int64 => write!(f, "BIGINT"),
            DataType::Float32 => write!(f, "REAL"),
            DataType::Float64 => write!(f, "DOUBLE"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Varchar { max_len: Some(n) } => write!(f, "VARCHAR({n})"),
            DataType::Varchar { max_len: None } => write!(f, "VARCHAR"),
            DataType::Date => write!(f, "DATE"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Blob => write!(f, "BLOB"),
        }
    }
}
