//! Layered settings: built-in defaults, an optional TOML file, then
//! `SQLSEED_*` environment variables.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::{LoaderError, Result};
use crate::line::LineFormat;
use crate::store::StoreLocation;

pub const DEFAULT_CONFIG_FILE: &str = "sqlseed.toml";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Database file, or `:memory:`.
    pub database: String,
    pub data_dir: PathBuf,
    pub extension: String,
    pub separator: String,
    pub quote: String,
    /// Entity names in load order.
    pub entities: Vec<String>,
}

impl Settings {
    /// Reads `path` if it exists, then applies the environment on top.
    pub fn load(path: &Path) -> Result<Self> {
        let builder = Self::defaults()?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("SQLSEED")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("entities"),
            );
        Ok(builder.build()?.try_deserialize()?)
    }
    /// Settings from a TOML string over the defaults, without the environment.
    pub fn from_toml(toml: &str) -> Result<Self> {
        let builder = Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Ok(builder.build()?.try_deserialize()?)
    }
    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("database", "sqlseed.sqlite")?
            .set_default("data_dir", "data")?
            .set_default("extension", "csv")?
            .set_default("separator", ",")?
            .set_default("quote", "\"")?
            .set_default("entities", Vec::<String>::new())?)
    }
    pub fn location(&self) -> StoreLocation {
        StoreLocation::parse(&self.database)
    }
    pub fn line_format(&self) -> Result<LineFormat> {
        Ok(LineFormat::new(
            single_char("separator", &self.separator)?,
            single_char("quote", &self.quote)?,
        ))
    }
    pub fn require_entities(&self) -> Result<&[String]> {
        if self.entities.is_empty() {
            return Err(LoaderError::Config("no entities configured".to_string()));
        }
        Ok(&self.entities)
    }
}

fn single_char(key: &str, value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(LoaderError::Config(format!("'{key}' must be exactly one character, got '{value}'"))),
    }
}
