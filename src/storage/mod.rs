// Columnar Storage Module
//
// Tables live in memory as fragmented Arrow record batches. A data manager
// routes table lookups to registered data providers; the Arrow storage is
// the built-in provider.

pub mod arrow_storage;
pub mod data_mgr;
pub mod schema;

pub use arrow_storage::{ArrowStorage, TableOptions};
pub use data_mgr::{DataMgr, DataProvider};
pub use schema::{ColumnInfo, TableInfo, TypeInfo, TypeKind};

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use thiserror::Error;

/// Errors raised by the storage layer.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("table already exists: {0}")]
    TableAlreadyExists(String),
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("unsupported column type {dtype} for column {column}")]
    UnsupportedType { column: String, dtype: DataType },
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("invalid table options: {0}")]
    InvalidOptions(String),
    #[error("data provider already registered for schema id {0}")]
    ProviderAlreadyRegistered(u32),
    #[error(transparent)]
    Arrow(#[from] ArrowError),
}
