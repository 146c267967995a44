//! Row decoding: raw text fields to typed values.

use crate::error::{LoaderError, Result};
use crate::header::{ColumnSpec, ColumnType, ForeignKeyRef, TableSpec};
use crate::line::is_blank;
use crate::value::Value;

/// Values of one row, aligned with the table's non-trash columns.
pub type DecodedRow = Vec<Value>;

/// Turns the raw value of a foreign key column into the referenced key.
pub trait KeyResolver {
    fn resolve(&self, raw: &str, foreign_key: &ForeignKeyRef) -> Result<Value>;
}

pub struct RowDecoder<'t> {
    table: &'t TableSpec,
}

impl<'t> RowDecoder<'t> {
    pub fn new(table: &'t TableSpec) -> Self {
        Self { table }
    }

    /// Decodes one row. Blank rows (empty first field) yield `None`.
    pub fn decode<R: KeyResolver + ?Sized>(&self, fields: &[&str], resolver: &R) -> Result<Option<DecodedRow>> {
        if is_blank(fields) {
            return Ok(None);
        }
        if fields.len() != self.table.width() {
            return Err(LoaderError::RowShape {
                expected: self.table.width(),
                found: fields.len(),
            });
        }
        let mut row = Vec::with_capacity(fields.len());
        for (column, raw) in self.table.columns.iter().zip(fields) {
            let value = match &column.foreign_key {
                Some(foreign_key) => Some(resolver.resolve(raw, foreign_key)?),
                None => coerce(column, raw)?,
            };
            if let Some(value) = value {
                row.push(value);
            }
        }
        Ok(Some(row))
    }
}

/// Applies the column's type to a raw field. Trash columns yield `None`.
pub fn coerce(column: &ColumnSpec, raw: &str) -> Result<Option<Value>> {
    let value = match &column.column_type {
        ColumnType::Text | ColumnType::Passthrough(_) => Value::Text(raw.to_string()),
        ColumnType::Integer if raw.is_empty() => {
            if column.is_nullable() {
                Value::Null
            } else {
                Value::Integer(0)
            }
        }
        ColumnType::Integer => {
            let parsed = raw.trim().parse::<i64>().map_err(|_| LoaderError::TypeCoercion {
                column: column.name.clone(),
                value: raw.to_string(),
            })?;
            Value::Integer(parsed)
        }
        ColumnType::Trash => return Ok(None),
    };
    Ok(Some(value))
}
