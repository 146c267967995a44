//! Schema and load orchestration.
//!
//! For each entity: parse the header, decode every data row (resolving
//! foreign keys against tables loaded before it), create the table and insert
//! the rows in file order. Rows are decoded before the table is created, and
//! the table and its rows are written inside a per-entity savepoint that is
//! rolled back when an insert fails, so a failing row never leaves a
//! half-populated table behind.

use std::fs;
use std::path::Path;

use tracing::{debug, info, trace, warn};

use crate::decode::{DecodedRow, RowDecoder};
use crate::error::{LoaderError, Result};
use crate::header::TableSpec;
use crate::line::LineFormat;
use crate::order::dependency_order;
use crate::resolve::{Catalog, ForeignKeyResolver};
use crate::schema::TableSchema;
use crate::store::Store;

/// One input file: the entity name and the file's full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub source: String,
}

impl Entity {
    pub fn new(name: &str, source: &str) -> Self {
        Self { name: name.to_string(), source: source.to_string() }
    }
    /// Reads `<dir>/<name>.<extension>`.
    pub fn read(dir: &Path, name: &str, extension: &str) -> Result<Self> {
        let path = dir.join(format!("{name}.{extension}"));
        let source = fs::read_to_string(&path).map_err(|source| LoaderError::Io { path, source })?;
        Ok(Self { name: name.to_string(), source })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub table: String,
    pub rows: usize,
    pub blank_rows: usize,
    pub create_statement: String,
}

struct Prepared<'e> {
    spec: TableSpec,
    // (line number, line) of everything after the header
    body: Vec<(usize, &'e str)>,
}

pub struct Loader<S: Store> {
    store: S,
    catalog: Catalog,
    format: LineFormat,
}

impl<S: Store> Loader<S> {
    pub fn new(store: S) -> Self {
        Self::with_format(store, LineFormat::default())
    }
    pub fn with_format(store: S, format: LineFormat) -> Self {
        Self { store, catalog: Catalog::new(), format }
    }
    pub fn store(&self) -> &S {
        &self.store
    }
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Loads a single entity. Tables it references must already be loaded.
    pub fn load_entity(&mut self, entity: &Entity) -> Result<LoadReport> {
        let prepared = self.prepare(entity)?;
        self.load_prepared(prepared)
    }

    /// Parses every header first, then loads the entities with referenced
    /// tables ahead of their referrers.
    pub fn load_all(&mut self, entities: &[Entity]) -> Result<Vec<LoadReport>> {
        let mut prepared = entities
            .iter()
            .map(|entity| self.prepare(entity).map(Some))
            .collect::<Result<Vec<_>>>()?;
        let specs: Vec<TableSpec> = prepared.iter().flatten().map(|p| p.spec.clone()).collect();
        let order = dependency_order(&specs, &self.catalog)?;
        debug!(order = ?order.iter().map(|&i| specs[i].name.as_str()).collect::<Vec<_>>(), "load order");
        let mut reports = Vec::with_capacity(order.len());
        for i in order {
            if let Some(entity) = prepared[i].take() {
                reports.push(self.load_prepared(entity)?);
            }
        }
        Ok(reports)
    }

    /// Commits everything loaded and closes the store.
    pub fn finish(mut self) -> Result<()> {
        self.store.commit()?;
        self.store.close()
    }
    pub fn into_store(self) -> S {
        self.store
    }

    fn prepare<'e>(&self, entity: &'e Entity) -> Result<Prepared<'e>> {
        let mut lines = entity.source.lines().enumerate().map(|(i, line)| (i + 1, line));
        let (_, header) = lines.next().ok_or_else(|| LoaderError::header(&entity.name, "missing header line"))?;
        let spec = TableSpec::parse(&entity.name, header, &self.format)?;
        debug!(table = %spec.name, columns = spec.width(), explicit_key = spec.has_explicit_primary_key(), "parsed header");
        Ok(Prepared { spec, body: lines.collect() })
    }

    fn load_prepared(&mut self, prepared: Prepared<'_>) -> Result<LoadReport> {
        let Prepared { spec, body } = prepared;
        let schema = TableSchema::build(&spec, &self.catalog)?;
        let row_error = |line: usize, row: &str, source: LoaderError| LoaderError::Row {
            table: spec.name.clone(),
            line,
            row: row.to_string(),
            source: Box::new(source),
        };

        let decoder = RowDecoder::new(&spec);
        let resolver = ForeignKeyResolver::new(&self.store, &self.catalog);
        let mut rows: Vec<(usize, &str, DecodedRow)> = Vec::with_capacity(body.len());
        let mut blank_rows = 0;
        for (number, line) in body {
            let fields = self.format.split(line);
            match decoder.decode(&fields, &resolver) {
                Ok(Some(row)) => {
                    trace!(table = %spec.name, line = number, ?row, "decoded row");
                    rows.push((number, line, schema.complete_row(row)));
                }
                Ok(None) => blank_rows += 1,
                Err(e) => return Err(row_error(number, line, e)),
            }
        }

        let create_statement = schema.create_statement();
        debug!(sql = %create_statement, "create table");
        debug!(sql = %schema.insert_statement(), "insert");
        self.store.begin_entity()?;
        if let Err(e) = self.persist(&schema, &rows, row_error) {
            if let Err(rollback) = self.store.rollback_entity() {
                warn!(table = %spec.name, %rollback, "could not discard partial table");
            }
            return Err(e);
        }
        self.store.release_entity()?;
        info!(table = %spec.name, rows = rows.len(), "table loaded");
        let report = LoadReport {
            table: spec.name.clone(),
            rows: rows.len(),
            blank_rows,
            create_statement,
        };
        self.catalog.register(spec);
        Ok(report)
    }

    fn persist(
        &mut self,
        schema: &TableSchema,
        rows: &[(usize, &str, DecodedRow)],
        row_error: impl Fn(usize, &str, LoaderError) -> LoaderError,
    ) -> Result<()> {
        self.store.create_table(schema)?;
        for (number, line, row) in rows {
            self.store
                .insert_row(schema, row)
                .map_err(|e| row_error(*number, line, e))?;
        }
        Ok(())
    }
}
