use super::*;
use crate::arg::Arg;
use crate::error::DbError;
use crate::params::NamedArgs;

fn echo(expr: &str) -> crate::error::DbResult<Arg> {
    Ok(Arg::from(expr))
}

fn named(pairs: &[(&str, Arg)]) -> NamedArgs {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn expressions_become_placeholders_in_order() {
    let stmt = scan_expressions("SELECT * FROM t WHERE a = {x} AND b = {y.z}", echo).unwrap();
    assert_eq!(stmt.sql, "SELECT * FROM t WHERE a = ? AND b = ?");
    assert_eq!(stmt.args(), &[Arg::from("x"), Arg::from("y.z")]);
}

#[test]
fn doubled_braces_unescape_at_top_level() {
    let stmt = scan_expressions("SELECT '{{a}}' , {v}", echo).unwrap();
    assert_eq!(stmt.sql, "SELECT '{a}' , ?");
    assert_eq!(stmt.args(), &[Arg::from("v")]);
}

#[test]
fn doubled_braces_inside_expression_reach_evaluator() {
    let stmt = scan_expressions("x = {f({{a:1}})}", echo).unwrap();
    assert_eq!(stmt.sql, "x = ?");
    assert_eq!(stmt.args(), &[Arg::from("f({a:1})")]);
}

#[test]
fn unterminated_expression_is_malformed() {
    let err = scan_expressions("SELECT {a", echo).unwrap_err();
    assert!(matches!(err, DbError::MalformedTemplate { offset: 7, .. }));
}

#[test]
fn lone_closing_brace_is_malformed() {
    let err = scan_expressions("SELECT a }", echo).unwrap_err();
    assert!(matches!(err, DbError::MalformedTemplate { offset: 9, .. }));
}

#[test]
fn nested_opening_brace_is_malformed() {
    let err = scan_expressions("SELECT {a {b}}", echo).unwrap_err();
    assert!(err.is_malformed_template());
}

#[test]
fn evaluator_error_passes_through() {
    let err = scan_expressions("SELECT {boom}", |e: &str| Err(DbError::eval(e, "no such binding")))
        .unwrap_err();
    assert!(matches!(err, DbError::Eval { ref expr, .. } if expr == "boom"));
}

#[test]
fn template_without_expressions_is_unchanged() {
    let stmt = scan_expressions("SELECT 1", |_: &str| -> crate::error::DbResult<Arg> {
        panic!("evaluator must not run")
    })
    .unwrap();
    assert_eq!(stmt, Statement::raw("SELECT 1"));
}

#[test]
fn named_arguments_bind_in_order_of_appearance() {
    let args = named(&[("id", Arg::from(7)), ("name", Arg::from("Jo"))]);
    let stmt = scan_named("UPDATE t SET name = :name WHERE id = :id OR parent = :id", &args);
    assert_eq!(stmt.sql, "UPDATE t SET name = ? WHERE id = ? OR parent = ?");
    assert_eq!(
        stmt.args(),
        &[Arg::from("Jo"), Arg::from(7), Arg::from(7)]
    );
}

#[test]
fn missing_name_binds_null() {
    let stmt = scan_named("SELECT * FROM t WHERE a = :missing", &NamedArgs::new());
    assert_eq!(stmt.sql, "SELECT * FROM t WHERE a = ?");
    assert_eq!(stmt.args(), &[Arg::null()]);
}

#[test]
fn cast_outside_name_passes_through() {
    let stmt = scan_named("x::int", &NamedArgs::new());
    assert_eq!(stmt.sql, "x::int");
    assert!(stmt.args.is_empty());
}

#[test]
fn cast_after_name_ends_the_name() {
    let args = named(&[("id", Arg::from(1))]);
    let stmt = scan_named("SELECT :id::int", &args);
    assert_eq!(stmt.sql, "SELECT ?::int");
    assert_eq!(stmt.args(), &[Arg::from(1)]);
}

#[test]
fn adjacent_names_stay_aligned() {
    let args = named(&[("a", Arg::from(1)), ("b", Arg::from(2))]);
    let stmt = scan_named("SELECT :a:b", &args);
    assert_eq!(stmt.sql, "SELECT ??");
    assert_eq!(stmt.args(), &[Arg::from(1), Arg::from(2)]);
}

#[test]
fn symbols_end_names_and_are_copied() {
    let args = named(&[("a", Arg::from(1)), ("b", Arg::from(2))]);
    let stmt = scan_named("f(:a,:b)\n", &args);
    assert_eq!(stmt.sql, "f(?,?)\n");
    assert_eq!(stmt.args.len(), 2);
}

#[test]
fn backslash_is_part_of_a_name() {
    let args = named(&[("a\\b", Arg::from(1))]);
    let stmt = scan_named("x = :a\\b", &args);
    assert_eq!(stmt.sql, "x = ?");
    assert_eq!(stmt.args(), &[Arg::from(1)]);
}

#[test]
fn name_at_end_of_input_is_bound() {
    let args = named(&[("last", Arg::from("z"))]);
    let stmt = scan_named("WHERE v = :last", &args);
    assert_eq!(stmt.sql, "WHERE v = ?");
    assert_eq!(stmt.args(), &[Arg::from("z")]);
}

#[test]
fn placeholder_count_matches_argument_count() {
    let args = named(&[("a", Arg::from(1))]);
    for sql in ["a = :a", "a = :a AND b = :b", "x::text = :a", "(:a, :b, :c)"] {
        let stmt = scan_named(sql, &args);
        assert_eq!(stmt.placeholder_count(), stmt.args.len(), "{sql}");
    }
}
