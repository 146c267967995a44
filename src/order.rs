//! Load order: every referenced table before its referrers.

use std::collections::HashSet;

use crate::error::{LoaderError, Result};
use crate::header::TableSpec;
use crate::resolve::Catalog;

/// Returns the indexes of `tables` in an order where each table comes after
/// every table it references. Among the tables that are ready, the one listed
/// first always goes next, so an order that is already valid is kept as is.
///
/// Tables already in `loaded` satisfy references without being scheduled.
/// Fails on duplicate names, references to unknown tables, and cycles
/// (a table referencing itself included).
pub fn dependency_order(tables: &[TableSpec], loaded: &Catalog) -> Result<Vec<usize>> {
    let mut names = HashSet::new();
    for table in tables {
        if loaded.contains(&table.name) {
            return Err(LoaderError::order(format!("table '{}' is already loaded", table.name)));
        }
        if !names.insert(table.name.as_str()) {
            return Err(LoaderError::order(format!("table '{}' is listed twice", table.name)));
        }
    }
    let mut dependencies = Vec::with_capacity(tables.len());
    for table in tables {
        let mut targets = HashSet::new();
        for (_, foreign_key) in table.foreign_keys() {
            let target = foreign_key.table.as_str();
            if loaded.contains(target) {
                continue;
            }
            if !names.contains(target) {
                return Err(LoaderError::order(format!(
                    "table '{}' references '{}', which is neither loaded nor scheduled",
                    table.name, target
                )));
            }
            targets.insert(target);
        }
        dependencies.push(targets);
    }

    let mut order = Vec::with_capacity(tables.len());
    let mut done: HashSet<&str> = HashSet::new();
    while order.len() < tables.len() {
        let next = (0..tables.len()).find(|&i| {
            !done.contains(tables[i].name.as_str())
                && dependencies[i].iter().all(|target| done.contains(target))
        });
        match next {
            Some(i) => {
                done.insert(tables[i].name.as_str());
                order.push(i);
            }
            None => {
                let stuck: Vec<&str> = tables
                    .iter()
                    .map(|t| t.name.as_str())
                    .filter(|name| !done.contains(name))
                    .collect();
                return Err(LoaderError::order(format!(
                    "reference cycle among tables: {}",
                    stuck.join(", ")
                )));
            }
        }
    }
    Ok(order)
}
