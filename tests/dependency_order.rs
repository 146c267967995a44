mod common;

use common::{cities, memory_loader, rows};
use sqlseed::error::LoaderError;
use sqlseed::header::TableSpec;
use sqlseed::line::LineFormat;
use sqlseed::loader::Entity;
use sqlseed::order::dependency_order;
use sqlseed::resolve::Catalog;
use sqlseed::value::Value;

fn spec(name: &str, header: &str) -> TableSpec {
    TableSpec::parse(name, header, &LineFormat::default()).expect("spec")
}

fn order_of(tables: &[TableSpec]) -> Result<Vec<usize>, LoaderError> {
    dependency_order(tables, &Catalog::new())
}

#[test]
fn valid_order_is_kept() {
    let tables = [
        spec("city", "name:text:un"),
        spec("station", "name:text,cityid:integer::city[name]"),
        spec("kilo", "stationid:integer::station[name],cityid:integer::city[name]"),
    ];
    assert_eq!(order_of(&tables).unwrap(), vec![0, 1, 2]);
}

#[test]
fn referenced_tables_are_moved_forward_stably() {
    let tables = [
        spec("company", "name:text"),
        spec("station", "name:text,cityid:integer::city[name]"),
        spec("city", "name:text:un"),
        spec("fare", "price:integer"),
    ];
    assert_eq!(order_of(&tables).unwrap(), vec![0, 2, 1, 3]);
}

#[test]
fn cycles_fail_fast() {
    let tables = [
        spec("a", "name:text,bid:integer::b[name]"),
        spec("b", "name:text,aid:integer::a[name]"),
        spec("c", "name:text"),
    ];
    let err = order_of(&tables).unwrap_err();
    match &err {
        LoaderError::DependencyOrder { message } => {
            assert!(message.contains("cycle"));
            assert!(message.contains("a, b"));
            assert!(!message.ends_with(", c"));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn self_reference_is_a_cycle() {
    let tables = [spec("line", "name:text:un,parentid:integer::line[name]")];
    assert!(matches!(order_of(&tables), Err(LoaderError::DependencyOrder { .. })));
}

#[test]
fn unknown_and_duplicate_tables_are_rejected() {
    let unknown = [spec("station", "cityid:integer::city[name]")];
    assert!(matches!(order_of(&unknown), Err(LoaderError::DependencyOrder { .. })));
    let twice = [spec("city", "name:text"), spec("city", "name:text")];
    assert!(matches!(order_of(&twice), Err(LoaderError::DependencyOrder { .. })));
}

#[test]
fn already_loaded_tables_satisfy_references() {
    let mut loader = memory_loader();
    loader.load_entity(&cities()).expect("cities");
    let station = [spec("station", "name:text,cityid:integer::city[name]")];
    assert_eq!(dependency_order(&station, loader.catalog()).unwrap(), vec![0]);
    let again = [spec("city", "name:text")];
    assert!(dependency_order(&again, loader.catalog()).is_err());
}

#[test]
fn load_all_reorders_misordered_entities() {
    let mut loader = memory_loader();
    let reports = loader
        .load_all(&[
            Entity::new("station", "name:text:un,cityid:integer::city[name]\n\"Umeda\",\"Osaka\"\n"),
            cities(),
        ])
        .expect("load");
    let loaded: Vec<&str> = reports.iter().map(|r| r.table.as_str()).collect();
    assert_eq!(loaded, vec!["city", "station"]);
    assert_eq!(rows(loader.store(), "select cityid from station"), vec![vec![Value::Integer(2)]]);
}

#[test]
fn load_all_checks_every_header_before_loading() {
    let mut loader = memory_loader();
    let err = loader
        .load_all(&[cities(), Entity::new("broken", "name\n\"x\"\n")])
        .unwrap_err();
    assert!(matches!(err, LoaderError::HeaderParse { .. }));
    assert!(loader.catalog().is_empty());
}
