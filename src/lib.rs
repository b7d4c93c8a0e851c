pub mod config;

pub mod catalog;
pub mod types;
