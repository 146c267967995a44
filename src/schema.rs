//! Schema and statement generation.
//!
//! A [`TableSchema`] is what actually gets persisted for an entity: its
//! declared columns minus the trash ones, preceded by a synthesized
//! `<table>id INTEGER PRIMARY KEY AUTOINCREMENT` column when no primary key
//! was declared. It renders the `CREATE TABLE` statement and the `INSERT`
//! statement used for every row.

use crate::decode::DecodedRow;
use crate::error::Result;
use crate::header::{Constraint, ConstraintSet, TableSpec};
use crate::resolve::Catalog;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    pub name: String,
    pub sql_type: String,
    pub constraints: ConstraintSet,
    pub autoincrement: bool,
    /// Referenced `(table, key column)`.
    pub references: Option<(String, String)>,
}

impl SchemaColumn {
    fn definition(&self) -> String {
        let mut definition = quote_identifier(&self.name);
        if !self.sql_type.is_empty() {
            definition.push(' ');
            definition.push_str(&self.sql_type);
        }
        if self.autoincrement {
            definition.push_str(" PRIMARY KEY AUTOINCREMENT");
        }
        if self.constraints.contains(Constraint::NotNull) {
            definition.push_str(" NOT NULL");
        }
        if self.constraints.contains(Constraint::Unique) {
            definition.push_str(" UNIQUE");
        }
        definition
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<SchemaColumn>,
    /// Declared primary key columns; empty when the key is synthesized.
    pub primary_key: Vec<String>,
    insert: String,
}

impl TableSchema {
    /// Builds the persisted schema of `table`. Referenced tables must already
    /// be in `catalog`.
    pub fn build(table: &TableSpec, catalog: &Catalog) -> Result<Self> {
        let mut keys = catalog.key_columns(table)?.into_iter();
        let mut columns = Vec::with_capacity(table.width() + 1);
        if !table.has_explicit_primary_key() {
            columns.push(SchemaColumn {
                name: table.surrogate_key_name(),
                sql_type: "INTEGER".to_string(),
                constraints: ConstraintSet::new().with(Constraint::PrimaryKey),
                autoincrement: true,
                references: None,
            });
        }
        for column in table.columns.iter().filter(|c| !c.column_type.is_trash()) {
            let references = match &column.foreign_key {
                Some(foreign_key) => keys.next().map(|key| (foreign_key.table.clone(), key)),
                None => None,
            };
            columns.push(SchemaColumn {
                name: column.name.clone(),
                sql_type: column.column_type.sql_type().to_string(),
                constraints: column.constraints,
                autoincrement: false,
                references,
            });
        }
        let insert = insert_statement(&table.name, &columns);
        Ok(Self {
            table: table.name.clone(),
            columns,
            primary_key: table.primary_key.clone(),
            insert,
        })
    }
    pub fn has_surrogate_key(&self) -> bool {
        self.primary_key.is_empty()
    }
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
    pub fn create_statement(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(SchemaColumn::definition).collect();
        if !self.primary_key.is_empty() {
            let key: Vec<String> = self.primary_key.iter().map(|c| quote_identifier(c)).collect();
            parts.push(format!("PRIMARY KEY ({})", key.join(", ")));
        }
        for column in &self.columns {
            if let Some((table, key)) = &column.references {
                parts.push(format!(
                    "FOREIGN KEY ({}) REFERENCES {} ({})",
                    quote_identifier(&column.name),
                    quote_identifier(table),
                    quote_identifier(key)
                ));
            }
        }
        format!("CREATE TABLE {} ({})", quote_identifier(&self.table), parts.join(", "))
    }
    pub fn insert_statement(&self) -> &str {
        &self.insert
    }
    /// Puts the surrogate key slot in front of a decoded row. The slot is
    /// `NULL` so that SQLite assigns the next key.
    pub fn complete_row(&self, mut row: DecodedRow) -> DecodedRow {
        if self.has_surrogate_key() {
            row.insert(0, Value::Null);
        }
        row
    }
}

fn insert_statement(table: &str, columns: &[SchemaColumn]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_identifier(&c.name)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        names.join(", "),
        placeholders.join(", ")
    )
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
