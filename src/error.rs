use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Header parse error in '{field}': {message}")]
    HeaderParse { field: String, message: String },
    #[error("Type coercion error in column '{column}': '{value}' is not a base-10 integer")]
    TypeCoercion { column: String, value: String },
    #[error("Foreign key resolution error: value '{value}' is not found in {table}.{column}")]
    ForeignKeyResolution { value: String, table: String, column: String },
    #[error("Row shape error: expected {expected} fields, found {found}")]
    RowShape { expected: usize, found: usize },
    #[error("Dependency order error: {message}")]
    DependencyOrder { message: String },
    #[error("Invalid reference from {table}.{column} to '{target}': {message}")]
    InvalidReference { table: String, column: String, target: String, message: String },
    #[error("Error in table '{table}' at line {line}: {source} (row: {row})")]
    Row { table: String, line: usize, row: String, #[source] source: Box<LoaderError> },
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error on '{}': {source}", .path.display())]
    Io { path: PathBuf, #[source] source: std::io::Error },
}

impl LoaderError {
    pub(crate) fn header(field: &str, message: impl Into<String>) -> Self {
        Self::HeaderParse { field: field.to_string(), message: message.into() }
    }
    pub(crate) fn order(message: impl Into<String>) -> Self {
        Self::DependencyOrder { message: message.into() }
    }
    /// The error that triggered a row failure, or the error itself.
    pub fn root(&self) -> &LoaderError {
        match self {
            Self::Row { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoaderError>;

// Helper conversions
impl From<rusqlite::Error> for LoaderError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}
impl From<config::ConfigError> for LoaderError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
