//! Sqlseed – populate a fresh SQLite database from header-described text files.
//!
//! Every input file describes one *entity* (one table). Its first line is a
//! header in a small schema language declaring, per column, a type, optional
//! constraints and an optional foreign key; the remaining lines are data rows:
//!
//! ```text
//! id:integer:p,name:text:un,cityid:integer::city[name]
//! 1,"Tokyo Station","Tokyo"
//! ```
//!
//! Foreign key columns hold a *natural key* of the referenced table (here a
//! city name), which is replaced by that row's key while loading. Tables
//! without a declared primary key get a synthesized `<table>id` column.
//!
//! ## Modules
//! * [`header`] – The header language: [`header::ColumnSpec`], [`header::TableSpec`].
//! * [`line`] – Field splitting and quote stripping shared by all lines.
//! * [`value`] – The typed cell value bound into SQLite.
//! * [`decode`] – Raw fields to typed rows, with the null rules per type.
//! * [`resolve`] – Foreign key lookups against already loaded tables.
//! * [`schema`] – `CREATE TABLE` and `INSERT` generation.
//! * [`order`] – Referenced-before-referrer ordering, failing on cycles.
//! * [`store`] – The [`store::Store`] capability and its SQLite implementation.
//! * [`loader`] – The per-entity pipeline tying it all together.
//! * [`config`] – Layered settings for the command line tool.
//!
//! ## Quick Start
//! ```
//! use sqlseed::loader::{Entity, Loader};
//! use sqlseed::store::{SqliteStore, StoreLocation};
//! let store = SqliteStore::open(StoreLocation::InMemory).unwrap();
//! let mut loader = Loader::new(store);
//! loader.load_all(&[
//!     Entity::new("city", "id:integer:p,name:text:un\n1,\"Tokyo\"\n2,\"Osaka\"\n"),
//!     Entity::new("station", "name:text:un,cityid:integer::city[name]\n\"Shinjuku\",\"Tokyo\"\n"),
//! ]).unwrap();
//! assert_eq!(loader.store().row_count("station").unwrap(), 1);
//! ```
//!
//! A run is all-or-nothing: the store holds one transaction that only
//! [`loader::Loader::finish`] commits.

pub mod config;
pub mod decode;
pub mod error;
pub mod header;
pub mod line;
pub mod loader;
pub mod order;
pub mod resolve;
pub mod schema;
pub mod store;
pub mod value;
