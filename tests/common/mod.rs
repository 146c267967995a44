#![allow(dead_code)]

use rusqlite::params;
use sqlseed::loader::{Entity, Loader};
use sqlseed::store::{SqliteStore, StoreLocation};
use sqlseed::value::Value;

pub fn memory_loader() -> Loader<SqliteStore> {
    Loader::new(SqliteStore::open(StoreLocation::InMemory).expect("store"))
}

pub fn cities() -> Entity {
    Entity::new("city", "id:integer:p,name:text:un\n1,\"Tokyo\"\n2,\"Osaka\"\n")
}

/// (name, declared type, not null, primary key position) per column.
pub fn table_info(store: &SqliteStore, table: &str) -> Vec<(String, String, bool, i64)> {
    let mut statement = store
        .connection()
        .prepare("select name, type, \"notnull\", pk from pragma_table_info(?1) order by cid")
        .expect("prepare");
    statement
        .query_map(params![table], |r| Ok((r.get(0)?, r.get(1)?, r.get::<_, i64>(2)? != 0, r.get(3)?)))
        .expect("query")
        .map(|r| r.expect("row"))
        .collect()
}

pub fn rows(store: &SqliteStore, sql: &str) -> Vec<Vec<Value>> {
    let mut statement = store.connection().prepare(sql).expect("prepare");
    let width = statement.column_count();
    statement
        .query_map([], |r| (0..width).map(|i| r.get::<_, Value>(i)).collect())
        .expect("query")
        .map(|r| r.expect("row"))
        .collect()
}

pub fn table_exists(store: &SqliteStore, table: &str) -> bool {
    store
        .connection()
        .query_row(
            "select count(*) from sqlite_master where type = 'table' and name = ?1",
            params![table],
            |r| r.get::<_, i64>(0),
        )
        .expect("query")
        > 0
}
