//! Header mini-language.
//!
//! The first line of every entity file declares its columns, one field per
//! column, each field made of colon separated parts:
//!
//! ```text
//! name:type[:constraints][:table[column]]
//! ```
//!
//! * `type` is `text`, `integer` or `trash`; anything else is passed through
//!   to the generated schema verbatim.
//! * `constraints` holds the letters `p` (primary key), `n` (not null) and
//!   `u` (unique) in any order.
//! * `table[column]` makes the column a foreign key: the raw value is looked
//!   up in `column` of `table` and replaced by that row's key.
//!
//! ```
//! use sqlseed::header::{parse_header, ColumnType};
//! use sqlseed::line::LineFormat;
//! let columns = parse_header("id:integer:p,name:text:un,cityid:integer::city[name]", &LineFormat::default()).unwrap();
//! assert_eq!(columns[1].column_type, ColumnType::Text);
//! assert_eq!(columns[2].foreign_key.as_ref().unwrap().table, "city");
//! ```

use std::collections::HashSet;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::error::{LoaderError, Result};
use crate::line::LineFormat;

lazy_static! {
    static ref FOREIGN_KEY: Regex = Regex::new(r"^([^\[\]]+)\[([^\[\]]+)\]$").unwrap();
}

// ------------- Column type -------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Text,
    Integer,
    /// Present in the file for alignment only, never persisted.
    Trash,
    /// Unrecognized tag, kept as written.
    Passthrough(String),
}

impl ColumnType {
    pub fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("text") {
            Self::Text
        } else if tag.eq_ignore_ascii_case("integer") {
            Self::Integer
        } else if tag.eq_ignore_ascii_case("trash") {
            Self::Trash
        } else {
            Self::Passthrough(tag.to_string())
        }
    }
    pub fn tag(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Trash => "trash",
            Self::Passthrough(tag) => tag.as_str(),
        }
    }
    /// The column type used in generated `CREATE TABLE` statements.
    pub fn sql_type(&self) -> &str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Trash => "",
            Self::Passthrough(tag) => tag.as_str(),
        }
    }
    pub fn is_trash(&self) -> bool {
        matches!(self, Self::Trash)
    }
}

// ------------- Constraints -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    PrimaryKey,
    NotNull,
    Unique,
}

impl Constraint {
    pub const ALL: [Constraint; 3] = [Self::PrimaryKey, Self::NotNull, Self::Unique];

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'p' => Some(Self::PrimaryKey),
            'n' => Some(Self::NotNull),
            'u' => Some(Self::Unique),
            _ => None,
        }
    }
    pub fn code(self) -> char {
        match self {
            Self::PrimaryKey => 'p',
            Self::NotNull => 'n',
            Self::Unique => 'u',
        }
    }
    fn bit(self) -> u8 {
        match self {
            Self::PrimaryKey => 1,
            Self::NotNull => 2,
            Self::Unique => 4,
        }
    }
}

/// Constraint flags of one column, decoded once from its code letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConstraintSet(u8);

impl ConstraintSet {
    pub fn new() -> Self {
        Self(0)
    }
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.insert(constraint);
        self
    }
    pub fn insert(&mut self, constraint: Constraint) {
        self.0 |= constraint.bit();
    }
    pub fn contains(&self, constraint: Constraint) -> bool {
        self.0 & constraint.bit() != 0
    }
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
    pub fn iter(&self) -> impl Iterator<Item = Constraint> + '_ {
        Constraint::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for constraint in self.iter() {
            write!(f, "{}", constraint.code())?;
        }
        Ok(())
    }
}

// ------------- Foreign key -------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForeignKeyRef {
    pub table: String,
    /// Natural key column of `table` matched against the raw value.
    pub column: String,
}

impl ForeignKeyRef {
    pub fn new(table: &str, column: &str) -> Self {
        Self { table: table.to_string(), column: column.to_string() }
    }
    pub fn parse(expression: &str) -> Option<Self> {
        let captures = FOREIGN_KEY.captures(expression)?;
        Some(Self::new(&captures[1], &captures[2]))
    }
}

impl fmt::Display for ForeignKeyRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}[{}]", self.table, self.column)
    }
}

// ------------- Column -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
    pub constraints: ConstraintSet,
    pub foreign_key: Option<ForeignKeyRef>,
}

impl ColumnSpec {
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            constraints: ConstraintSet::new(),
            foreign_key: None,
        }
    }
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.insert(constraint);
        self
    }
    pub fn with_foreign_key(mut self, foreign_key: ForeignKeyRef) -> Self {
        self.foreign_key = Some(foreign_key);
        self
    }
    /// Parses one header field, `name:type[:constraints][:table[column]]`.
    pub fn parse(field: &str) -> Result<Self> {
        let parts: Vec<&str> = field.split(':').map(str::trim).collect();
        if parts.len() < 2 {
            return Err(LoaderError::header(field, "expected at least 'name:type'"));
        }
        if parts.len() > 4 {
            return Err(LoaderError::header(field, "expected at most four ':'-separated parts"));
        }
        let name = parts[0];
        if name.is_empty() {
            return Err(LoaderError::header(field, "column name is empty"));
        }
        let mut column = ColumnSpec::new(name, ColumnType::from_tag(parts[1]));
        if let Some(codes) = parts.get(2) {
            for code in codes.chars() {
                match Constraint::from_code(code) {
                    Some(constraint) => column.constraints.insert(constraint),
                    None => warn!(column = name, %code, "ignoring unknown constraint code"),
                }
            }
        }
        if let Some(expression) = parts.get(3) {
            let foreign_key = ForeignKeyRef::parse(expression).ok_or_else(|| {
                LoaderError::header(field, format!("foreign key '{expression}' does not match 'table[column]'"))
            })?;
            column.foreign_key = Some(foreign_key);
        }
        Ok(column)
    }
    pub fn is_primary_key(&self) -> bool {
        self.constraints.contains(Constraint::PrimaryKey)
    }
    pub fn is_nullable(&self) -> bool {
        !self.constraints.contains(Constraint::NotNull)
    }
    pub fn is_unique(&self) -> bool {
        self.constraints.contains(Constraint::Unique)
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.column_type.tag())?;
        match &self.foreign_key {
            Some(foreign_key) => write!(f, ":{}:{}", self.constraints, foreign_key),
            None if !self.constraints.is_empty() => write!(f, ":{}", self.constraints),
            None => Ok(()),
        }
    }
}

/// Parses a complete header line into its column list.
pub fn parse_header(line: &str, format: &LineFormat) -> Result<Vec<ColumnSpec>> {
    let line = line.strip_prefix('\u{feff}').unwrap_or(line);
    format.split(line).into_iter().map(ColumnSpec::parse).collect()
}

/// Renders a column list back into a header line.
pub fn write_header(columns: &[ColumnSpec], format: &LineFormat) -> String {
    let fields: Vec<String> = columns.iter().map(ToString::to_string).collect();
    format.join(&fields)
}

// ------------- Table -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    /// Names of the columns flagged `p`, in declaration order.
    pub primary_key: Vec<String>,
}

impl TableSpec {
    pub fn new(name: &str, columns: Vec<ColumnSpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(LoaderError::header(&column.to_string(), format!("duplicate column name '{}'", column.name)));
            }
            if column.column_type.is_trash() && column.foreign_key.is_some() {
                return Err(LoaderError::header(&column.to_string(), "a trash column cannot reference another table"));
            }
        }
        let primary_key: Vec<String> = columns
            .iter()
            .filter(|c| c.is_primary_key())
            .map(|c| c.name.clone())
            .collect();
        let table = Self { name: name.to_string(), columns, primary_key };
        if !table.has_explicit_primary_key() {
            let surrogate = table.surrogate_key_name();
            if let Some(column) = table.columns.iter().find(|c| c.name == surrogate) {
                return Err(LoaderError::header(
                    &column.to_string(),
                    format!("column '{surrogate}' clashes with the synthesized primary key"),
                ));
            }
        }
        Ok(table)
    }
    pub fn parse(name: &str, line: &str, format: &LineFormat) -> Result<Self> {
        Self::new(name, parse_header(line, format)?)
    }
    pub fn has_explicit_primary_key(&self) -> bool {
        !self.primary_key.is_empty()
    }
    pub fn surrogate_key_name(&self) -> String {
        format!("{}id", self.name)
    }
    /// The column other tables reference: the synthesized `<table>id`, or the
    /// declared primary key when it is a single column.
    pub fn key_column(&self) -> Option<String> {
        match self.primary_key.as_slice() {
            [] => Some(self.surrogate_key_name()),
            [single] => Some(single.clone()),
            _ => None,
        }
    }
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&ColumnSpec, &ForeignKeyRef)> {
        self.columns
            .iter()
            .filter_map(|c| c.foreign_key.as_ref().map(|fk| (c, fk)))
    }
    /// Number of fields every data row must carry, trash included.
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}
