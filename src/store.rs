// used for persistence
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{LoaderError, Result};
use crate::schema::{quote_identifier, TableSchema};
use crate::value::Value;

/// Where the relational store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    InMemory,
    File(PathBuf),
}

impl StoreLocation {
    /// `:memory:` selects an in-memory store, anything else is a file path.
    pub fn parse(location: &str) -> Self {
        if location == ":memory:" {
            Self::InMemory
        } else {
            Self::File(PathBuf::from(location))
        }
    }
}

/// What the loader needs from the database it populates.
pub trait Store {
    fn create_table(&mut self, schema: &TableSchema) -> Result<()>;
    fn insert_row(&mut self, schema: &TableSchema, row: &[Value]) -> Result<()>;
    /// Key of the first row of `table` whose `natural_column` equals `value`.
    fn find_key(&self, table: &str, key_column: &str, natural_column: &str, value: &str) -> Result<Option<Value>>;
    /// Marks the start of one entity's writes.
    fn begin_entity(&mut self) -> Result<()>;
    /// Keeps everything written since [`Store::begin_entity`].
    fn release_entity(&mut self) -> Result<()>;
    /// Discards everything written since [`Store::begin_entity`], the table included.
    fn rollback_entity(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

// ------------- Persistence -------------
pub struct SqliteStore {
    db: Connection,
    location: StoreLocation,
}

impl SqliteStore {
    /// Opens the store with foreign keys enforced and a transaction begun;
    /// nothing is kept unless [`Store::commit`] is called.
    pub fn open(location: StoreLocation) -> Result<Self> {
        let db = match &location {
            StoreLocation::InMemory => Connection::open_in_memory()?,
            StoreLocation::File(path) => Connection::open(path)?,
        };
        // foreign_keys is a no-op inside a transaction, so it goes first
        db.execute_batch(
            "
            pragma foreign_keys = on;
            begin;
            ",
        )?;
        Ok(Self { db, location })
    }
    /// Deletes any existing database file, then opens a fresh store.
    pub fn recreate(location: StoreLocation) -> Result<Self> {
        if let StoreLocation::File(path) = &location {
            remove_existing(path)?;
        }
        Self::open(location)
    }
    pub fn location(&self) -> &StoreLocation {
        &self.location
    }
    pub fn connection(&self) -> &Connection {
        &self.db
    }
    /// Number of rows currently in `table`.
    pub fn row_count(&self, table: &str) -> Result<usize> {
        let count: i64 = self.db.query_row(
            &format!("select count(*) from {}", quote_identifier(table)),
            params![],
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }
}

fn remove_existing(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed existing database");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LoaderError::Io { path: path.to_path_buf(), source }),
    }
}

impl Store for SqliteStore {
    fn create_table(&mut self, schema: &TableSchema) -> Result<()> {
        // a single statement only, whatever a passthrough type tag contains
        self.db.execute(&schema.create_statement(), [])?;
        Ok(())
    }
    fn insert_row(&mut self, schema: &TableSchema, row: &[Value]) -> Result<()> {
        self.db
            .prepare_cached(schema.insert_statement())?
            .execute(params_from_iter(row.iter()))?;
        Ok(())
    }
    fn find_key(&self, table: &str, key_column: &str, natural_column: &str, value: &str) -> Result<Option<Value>> {
        let lookup = format!(
            "select {} from {} where {} = ?1 limit 1",
            quote_identifier(key_column),
            quote_identifier(table),
            quote_identifier(natural_column)
        );
        let key = self
            .db
            .prepare_cached(&lookup)?
            .query_row(params![value], |r| r.get::<_, Value>(0))
            .optional()?;
        Ok(key)
    }
    fn begin_entity(&mut self) -> Result<()> {
        self.db.execute_batch("savepoint entity;")?;
        Ok(())
    }
    fn release_entity(&mut self) -> Result<()> {
        self.db.execute_batch("release entity;")?;
        Ok(())
    }
    fn rollback_entity(&mut self) -> Result<()> {
        self.db.execute_batch("rollback to entity; release entity;")?;
        Ok(())
    }
    fn commit(&mut self) -> Result<()> {
        if !self.db.is_autocommit() {
            self.db.execute_batch("commit;")?;
        }
        Ok(())
    }
    fn close(self) -> Result<()> {
        self.db.close().map_err(|(_, e)| e.into())
    }
}
