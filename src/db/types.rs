//! Database-agnostic type mappings.
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies a column into a logical category
//! 2. Database-specific decoders extract the value as a [`CellValue`]
//!
//! PostgreSQL rows come back in text format (raw SQL uses the simple query
//! protocol), so anything that is not a number, boolean or bytea is read as
//! its text representation. SQLite is dynamically typed, so its decoder
//! looks at the storage class of each value rather than the declared type.

use crate::error::{DbError, DbResult};
use crate::models::CellValue;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Boolean,
    Binary,
    Text,
}

/// Classify a database type name into a logical category.
///
/// Names are matched exactly; `INTERVAL` or `POINT` must not be mistaken
/// for integers.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    match type_name.to_ascii_uppercase().as_str() {
        "INT2" | "INT4" | "INT8" | "SMALLINT" | "INT" | "INTEGER" | "BIGINT" | "SMALLSERIAL"
        | "SERIAL" | "BIGSERIAL" => TypeCategory::Integer,
        "FLOAT4" | "FLOAT8" | "REAL" | "DOUBLE PRECISION" | "DOUBLE" | "FLOAT" => {
            TypeCategory::Float
        }
        "BOOL" | "BOOLEAN" => TypeCategory::Boolean,
        "BYTEA" | "BLOB" => TypeCategory::Binary,
        _ => TypeCategory::Text,
    }
}

// =============================================================================
// Row Decoding
// =============================================================================

/// Access to a backend row as ordered, dynamically typed cells.
pub trait RowDecoder {
    fn column_names(&self) -> Vec<String>;
    fn column_count(&self) -> usize;
    fn decode_cell(&self, idx: usize) -> DbResult<CellValue>;
}

impl RowDecoder for PgRow {
    fn column_names(&self) -> Vec<String> {
        self.columns().iter().map(|c| c.name().to_string()).collect()
    }

    fn column_count(&self) -> usize {
        self.len()
    }

    fn decode_cell(&self, idx: usize) -> DbResult<CellValue> {
        let column = self.columns().get(idx).ok_or_else(|| {
            DbError::decode(format!("column index {} out of bounds", idx))
        })?;
        postgres::decode_column(self, idx, column.type_info().name())
    }
}

impl RowDecoder for SqliteRow {
    fn column_names(&self) -> Vec<String> {
        self.columns().iter().map(|c| c.name().to_string()).collect()
    }

    fn column_count(&self) -> usize {
        self.len()
    }

    fn decode_cell(&self, idx: usize) -> DbResult<CellValue> {
        let column = self.columns().get(idx).ok_or_else(|| {
            DbError::decode(format!("column index {} out of bounds", idx))
        })?;
        sqlite::decode_column(self, idx, column.type_info().name())
    }
}

// =============================================================================
// Database-Specific Decoders
// =============================================================================

mod postgres {
    use super::*;

    pub fn decode_column(row: &PgRow, idx: usize, type_name: &str) -> DbResult<CellValue> {
        let value = match categorize_type(type_name) {
            TypeCategory::Integer => {
                let v = match type_name {
                    "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(i64::from),
                    "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(i64::from),
                    _ => row.try_get::<Option<i64>, _>(idx)?,
                };
                v.map(CellValue::Integer)
            }
            TypeCategory::Float => {
                let v = match type_name {
                    "FLOAT4" => row.try_get::<Option<f32>, _>(idx)?.map(f64::from),
                    _ => row.try_get::<Option<f64>, _>(idx)?,
                };
                v.map(CellValue::Float)
            }
            TypeCategory::Boolean => row.try_get::<Option<bool>, _>(idx)?.map(CellValue::Bool),
            TypeCategory::Binary => row
                .try_get::<Option<Vec<u8>>, _>(idx)?
                .map(CellValue::Bytes),
            // numeric, dates, json, uuid, arrays, ... keep the server's rendering
            TypeCategory::Text => row
                .try_get_unchecked::<Option<String>, _>(idx)?
                .map(CellValue::Text),
        };
        Ok(value.unwrap_or(CellValue::Null))
    }
}

mod sqlite {
    use super::*;

    pub fn decode_column(row: &SqliteRow, idx: usize, declared: &str) -> DbResult<CellValue> {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok(CellValue::Null);
        }
        let storage = raw.type_info().name().to_string();

        let value = match storage.as_str() {
            "INTEGER" if categorize_type(declared) == TypeCategory::Boolean => {
                CellValue::Bool(row.try_get_unchecked::<i64, _>(idx)? != 0)
            }
            "INTEGER" => CellValue::Integer(row.try_get_unchecked::<i64, _>(idx)?),
            "REAL" => CellValue::Float(row.try_get_unchecked::<f64, _>(idx)?),
            "BLOB" => CellValue::Bytes(row.try_get_unchecked::<Vec<u8>, _>(idx)?),
            _ => CellValue::Text(row.try_get_unchecked::<String, _>(idx)?),
        };
        Ok(value)
    }
}
