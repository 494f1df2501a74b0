// Table Schema Descriptors
//
// Logical column types supported by the engine and the descriptors handed
// out for registered tables. The engine stores data in the Arrow types it
// executes on; anything else is rejected at import time.

use std::fmt;

use arrow::datatypes::{DataType, Field, SchemaRef};

use super::StorageError;

/// Logical column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Int64,
    Float64,
    Utf8,
    Boolean,
}

impl TypeKind {
    /// Map an Arrow type to a logical type, rejecting unsupported ones.
    pub fn from_arrow(column: &str, dtype: &DataType) -> Result<TypeKind, StorageError> {
        match dtype {
            DataType::Int64 => Ok(TypeKind::Int64),
            DataType::Float64 => Ok(TypeKind::Float64),
            DataType::Utf8 => Ok(TypeKind::Utf8),
            DataType::Boolean => Ok(TypeKind::Boolean),
            other => Err(StorageError::UnsupportedType {
                column: column.to_string(),
                dtype: other.clone(),
            }),
        }
    }

    pub fn to_arrow(self) -> DataType {
        match self {
            TypeKind::Int64 => DataType::Int64,
            TypeKind::Float64 => DataType::Float64,
            TypeKind::Utf8 => DataType::Utf8,
            TypeKind::Boolean => DataType::Boolean,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Int64 => write!(f, "BIGINT"),
            TypeKind::Float64 => write!(f, "DOUBLE"),
            TypeKind::Utf8 => write!(f, "TEXT"),
            TypeKind::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

/// Logical type plus nullability of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub kind: TypeKind,
    pub nullable: bool,
}

impl TypeInfo {
    pub fn new(kind: TypeKind, nullable: bool) -> Self {
        TypeInfo { kind, nullable }
    }

    pub fn from_field(field: &Field) -> Result<TypeInfo, StorageError> {
        Ok(TypeInfo {
            kind: TypeKind::from_arrow(field.name(), field.data_type())?,
            nullable: field.is_nullable(),
        })
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} NOT NULL", self.kind)
        }
    }
}

/// Descriptor of one column of a registered table.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub type_info: TypeInfo,
}

/// Descriptor of a registered table.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub id: u32,
    pub schema_id: u32,
    pub name: String,
    pub schema: SchemaRef,
    pub row_count: usize,
    pub fragment_count: usize,
}

impl TableInfo {
    pub fn columns(&self) -> Result<Vec<ColumnInfo>, StorageError> {
        self.schema
            .fields()
            .iter()
            .map(|field| {
                Ok(ColumnInfo {
                    name: field.name().clone(),
                    type_info: TypeInfo::from_field(field)?,
                })
            })
            .collect()
    }
}
