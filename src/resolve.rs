//! Foreign key resolution against tables loaded earlier in the run.

use std::collections::HashMap;

use tracing::trace;

use crate::decode::KeyResolver;
use crate::error::{LoaderError, Result};
use crate::header::{ForeignKeyRef, TableSpec};
use crate::store::Store;
use crate::value::Value;

/// Specs of every table loaded so far, keyed by table name.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: HashMap<String, TableSpec>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn register(&mut self, table: TableSpec) {
        self.tables.insert(table.name.clone(), table);
    }
    pub fn get(&self, name: &str) -> Option<&TableSpec> {
        self.tables.get(name)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
    pub fn len(&self) -> usize {
        self.tables.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
    /// Checks that every foreign key of `table` points at a loaded table,
    /// at an existing non-trash column, and at a table with a single key
    /// column. Returns the key column for each foreign key, in column order.
    pub fn key_columns(&self, table: &TableSpec) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for (column, foreign_key) in table.foreign_keys() {
            let invalid = |message: &str| LoaderError::InvalidReference {
                table: table.name.clone(),
                column: column.name.clone(),
                target: foreign_key.to_string(),
                message: message.to_string(),
            };
            let target = self.get(&foreign_key.table).ok_or_else(|| {
                LoaderError::order(format!(
                    "table '{}' references '{}', which has not been loaded",
                    table.name, foreign_key.table
                ))
            })?;
            match target.column(&foreign_key.column) {
                None => return Err(invalid("no such column")),
                Some(natural) if natural.column_type.is_trash() => {
                    return Err(invalid("the column is not persisted"));
                }
                Some(_) => {}
            }
            let key = target
                .key_column()
                .ok_or_else(|| invalid("the target has a composite primary key"))?;
            keys.push(key);
        }
        Ok(keys)
    }
}

/// `NULL` in any letter case, or an empty field, means no reference.
pub fn is_null_reference(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("NULL")
}

pub struct ForeignKeyResolver<'a, S: Store + ?Sized> {
    store: &'a S,
    catalog: &'a Catalog,
}

impl<'a, S: Store + ?Sized> ForeignKeyResolver<'a, S> {
    pub fn new(store: &'a S, catalog: &'a Catalog) -> Self {
        Self { store, catalog }
    }
}

impl<S: Store + ?Sized> KeyResolver for ForeignKeyResolver<'_, S> {
    fn resolve(&self, raw: &str, foreign_key: &ForeignKeyRef) -> Result<Value> {
        if is_null_reference(raw) {
            return Ok(Value::Null);
        }
        let key_column = self
            .catalog
            .get(&foreign_key.table)
            .and_then(TableSpec::key_column)
            .ok_or_else(|| {
                LoaderError::order(format!("table '{}' is not loaded or has no key column", foreign_key.table))
            })?;
        let key = self
            .store
            .find_key(&foreign_key.table, &key_column, &foreign_key.column, raw)?
            .ok_or_else(|| LoaderError::ForeignKeyResolution {
                value: raw.to_string(),
                table: foreign_key.table.clone(),
                column: foreign_key.column.clone(),
            })?;
        trace!(%foreign_key, raw, %key, "resolved reference");
        Ok(key)
    }
}
