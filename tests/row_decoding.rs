mod common;

use common::{memory_loader, rows};
use sqlseed::decode::{coerce, KeyResolver, RowDecoder};
use sqlseed::error::{LoaderError, Result};
use sqlseed::header::{ColumnSpec, ColumnType, Constraint, ForeignKeyRef, TableSpec};
use sqlseed::line::LineFormat;
use sqlseed::loader::Entity;
use sqlseed::value::Value;

struct NoReferences;
impl KeyResolver for NoReferences {
    fn resolve(&self, raw: &str, _: &ForeignKeyRef) -> Result<Value> {
        panic!("unexpected lookup of '{raw}'")
    }
}

fn spec(header: &str) -> TableSpec {
    TableSpec::parse("t", header, &LineFormat::default()).expect("spec")
}

#[test]
fn empty_integer_is_null_when_nullable_and_zero_when_not() {
    let nullable = ColumnSpec::new("a", ColumnType::Integer);
    let not_null = ColumnSpec::new("b", ColumnType::Integer).with_constraint(Constraint::NotNull);
    assert_eq!(coerce(&nullable, "").unwrap(), Some(Value::Null));
    assert_eq!(coerce(&not_null, "").unwrap(), Some(Value::Integer(0)));
    assert_eq!(coerce(&not_null, "-42").unwrap(), Some(Value::Integer(-42)));
}

#[test]
fn integers_tolerate_surrounding_whitespace() {
    let column = ColumnSpec::new("a", ColumnType::Integer);
    assert_eq!(coerce(&column, " 5").unwrap(), Some(Value::Integer(5)));
    assert_eq!(coerce(&column, "7 ").unwrap(), Some(Value::Integer(7)));
    assert!(matches!(coerce(&column, " "), Err(LoaderError::TypeCoercion { .. })));
    // text keeps its spaces
    let text = ColumnSpec::new("b", ColumnType::Text);
    assert_eq!(coerce(&text, " 5").unwrap(), Some(Value::from(" 5")));

    let mut loader = memory_loader();
    loader.load_entity(&Entity::new("t", "a:integer,b:integer\n1, 2\n")).expect("load");
    assert_eq!(rows(loader.store(), "select a, b from t"), vec![vec![Value::Integer(1), Value::Integer(2)]]);
}

#[test]
fn empty_integer_rule_holds_through_a_load() {
    let mut loader = memory_loader();
    loader
        .load_entity(&Entity::new("t", "label:text,a:integer,b:integer:n,c:integer:pn\nx,,,1\n"))
        .expect("load");
    assert_eq!(
        rows(loader.store(), "select label, a, b, c from t"),
        vec![vec![Value::from("x"), Value::Null, Value::Integer(0), Value::Integer(1)]]
    );
}

#[test]
fn text_and_passthrough_values_are_kept_verbatim() {
    let text = ColumnSpec::new("t", ColumnType::Text);
    let other = ColumnSpec::new("r", ColumnType::from_tag("real"));
    assert_eq!(coerce(&text, " padded ").unwrap(), Some(Value::from(" padded ")));
    assert_eq!(coerce(&text, "").unwrap(), Some(Value::from("")));
    assert_eq!(coerce(&other, "1.50").unwrap(), Some(Value::from("1.50")));
}

#[test]
fn trash_fields_are_consumed_and_dropped() {
    let table = spec("id:integer:p,note:trash,name:text");
    let row = RowDecoder::new(&table)
        .decode(&["7", "ignored", "Seven"], &NoReferences)
        .expect("decode");
    assert_eq!(row, Some(vec![Value::Integer(7), Value::from("Seven")]));
}

#[test]
fn unparseable_integer_is_a_coercion_error() {
    let table = spec("n:integer");
    let err = RowDecoder::new(&table).decode(&["12a"], &NoReferences).unwrap_err();
    match err {
        LoaderError::TypeCoercion { column, value } => {
            assert_eq!(column, "n");
            assert_eq!(value, "12a");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn field_count_must_match_the_header() {
    let table = spec("a:text,note:trash,b:text");
    let decoder = RowDecoder::new(&table);
    assert!(matches!(
        decoder.decode(&["x", "y"], &NoReferences),
        Err(LoaderError::RowShape { expected: 3, found: 2 })
    ));
    assert!(matches!(
        decoder.decode(&["x", "y", "z", "w"], &NoReferences),
        Err(LoaderError::RowShape { expected: 3, found: 4 })
    ));
}

#[test]
fn blank_rows_are_skipped_before_shape_checks() {
    let table = spec("a:text,b:text");
    let decoder = RowDecoder::new(&table);
    assert_eq!(decoder.decode(&[""], &NoReferences).unwrap(), None);
    assert_eq!(decoder.decode(&["", "x", "y"], &NoReferences).unwrap(), None);
}

#[test]
fn blank_rows_do_not_count() {
    let mut loader = memory_loader();
    let report = loader
        .load_entity(&Entity::new("t", "name:text\n\"a\"\n\n\"b\"\n,ignored\n\"c\"\r\n"))
        .expect("load");
    assert_eq!(report.rows, 3);
    assert_eq!(report.blank_rows, 2);
    assert_eq!(loader.store().row_count("t").unwrap(), 3);
    assert_eq!(
        rows(loader.store(), "select name from t order by tid"),
        vec![vec![Value::from("a")], vec![Value::from("b")], vec![Value::from("c")]]
    );
}

#[test]
fn row_failures_carry_line_and_content() {
    let mut loader = memory_loader();
    let err = loader
        .load_entity(&Entity::new("t", "name:text,n:integer\n\"a\",1\n\"b\",two\n"))
        .unwrap_err();
    match &err {
        LoaderError::Row { table, line, row, .. } => {
            assert_eq!(table, "t");
            assert_eq!(*line, 3);
            assert_eq!(row, "\"b\",two");
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(matches!(err.root(), LoaderError::TypeCoercion { .. }));
    assert!(err.to_string().contains("\"b\",two"));
}

#[test]
fn quotes_are_stripped_from_data_fields() {
    let format = LineFormat::default();
    assert_eq!(format.split("\"a\",b,\"\",\"\"c\"\""), vec!["a", "b", "", "c"]);
    assert_eq!(format.split("x,y\r"), vec!["x", "y"]);
}
