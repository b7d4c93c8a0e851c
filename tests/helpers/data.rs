use helium_catalog::catalog::column::ColumnDef;
use helium_catalog::types::datatype::DataType;

#[allow(dead_code)]
pub fn customer_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("ID", DataType::Int64).identity(),
        ColumnDef::new("NAME", DataType::Varchar { max_len: Some(100) }).not_null(),
        ColumnDef::new("EMAIL", DataType::Varchar { max_len: None }),
    ]
}

#[allow(dead_code)]
pub fn order_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("ID", DataType::Int64).not_null(),
        ColumnDef::new("CUSTOMER_ID", DataType::Int64),
        ColumnDef::new("AMOUNT", DataType::Float64),
        ColumnDef::new("PLACED", DataType::Timestamp),
    ]
}
