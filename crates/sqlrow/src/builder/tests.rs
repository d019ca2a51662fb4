use super::*;
use crate::arg::{Arg, SqlType};
use crate::dialect::Dialect;
use crate::error::DbError;
use crate::row::{Column, Row};

fn person() -> Row {
    Row::new().with("id", 7).with("name", "Jo")
}

#[test]
fn insert_with_key_is_guarded_on_postgres() {
    let row = person();
    let stmt = insert_row("people", &row).build(Dialect::Postgres).unwrap();
    assert_eq!(
        stmt.sql,
        "INSERT INTO people (id, name) SELECT ?, ? WHERE NOT EXISTS (SELECT 1 FROM people WHERE id = ?) RETURNING *"
    );
    assert_eq!(stmt.args(), &[Arg::from(7), Arg::from("Jo"), Arg::from(7)]);
}

#[test]
fn insert_with_key_selects_from_dual_on_oracle() {
    let row = person();
    let stmt = insert_row("people", &row).build(Dialect::Oracle).unwrap();
    assert_eq!(
        stmt.sql,
        "INSERT INTO people (id, name) SELECT ?, ? FROM DUAL WHERE NOT EXISTS (SELECT 1 FROM people WHERE id = ?)"
    );
    assert_eq!(stmt.args.len(), 3);
}

#[test]
fn insert_without_key_has_no_guard() {
    let row = Row::new().with("name", "Jo");
    let pg = insert_row("people", &row).build(Dialect::Postgres).unwrap();
    assert_eq!(pg.sql, "INSERT INTO people (name) SELECT ? RETURNING *");
    let ora = insert_row("people", &row).build(Dialect::Oracle).unwrap();
    assert_eq!(ora.sql, "INSERT INTO people (name) SELECT ? FROM DUAL");
}

#[test]
fn insert_with_null_or_literal_key_has_no_guard() {
    let row = Row::new().with("id", Arg::null()).with("name", "Jo");
    let stmt = insert_row("people", &row).build(Dialect::Oracle).unwrap();
    assert_eq!(stmt.sql, "INSERT INTO people (id, name) SELECT ?, ? FROM DUAL");

    let row = Row::new().with("id", Arg::sql("people_seq.nextval")).with("name", "Jo");
    let stmt = insert_row("people", &row).build(Dialect::Oracle).unwrap();
    assert_eq!(
        stmt.sql,
        "INSERT INTO people (id, name) SELECT people_seq.nextval, ? FROM DUAL"
    );
    assert_eq!(stmt.args(), &[Arg::from("Jo")]);
}

#[test]
fn zero_key_still_counts_as_present() {
    let row = Row::new().with("id", 0).with("name", "Jo");
    let stmt = insert_row("people", &row).build(Dialect::Postgres).unwrap();
    assert!(stmt.sql.contains("WHERE NOT EXISTS"));
}

#[test]
fn declared_column_types_box_values() {
    let row = Row::new().with("id", 7).with("born", "2000-01-02");
    let cols = [Column::typed("id", SqlType::Long), Column::typed("born", SqlType::Date)];
    let stmt = insert_row("people", &row)
        .columns(&cols)
        .build(Dialect::Postgres)
        .unwrap();
    assert_eq!(
        stmt.args(),
        &[
            Arg::typed(SqlType::Long, 7_i64),
            Arg::typed(SqlType::Date, "2000-01-02"),
            Arg::typed(SqlType::Long, 7_i64),
        ]
    );
}

#[test]
fn requested_column_missing_from_row_binds_null() {
    let row = Row::new().with("id", 1);
    let cols = [Column::new("id"), Column::new("note")];
    let stmt = insert_row("t", &row).columns(&cols).pk("uid").build(Dialect::Postgres).unwrap();
    assert_eq!(stmt.sql, "INSERT INTO t (id, note) SELECT ?, ? RETURNING *");
    assert_eq!(stmt.args(), &[Arg::from(1), Arg::null()]);
}

#[test]
fn insert_without_columns_is_rejected() {
    let row = Row::new();
    let err = insert_row("t", &row).build(Dialect::Postgres).unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));
}

#[test]
fn update_sets_everything_but_the_key() {
    let row = person();
    let stmt = update_row("people", &row).build(Dialect::Postgres).unwrap();
    assert_eq!(
        stmt.sql,
        "UPDATE people SET name = ? WHERE people.id = ? RETURNING *"
    );
    assert_eq!(stmt.args(), &[Arg::from("Jo"), Arg::from(7)]);

    let stmt = update_row("people", &row).build(Dialect::Oracle).unwrap();
    assert_eq!(stmt.sql, "UPDATE people SET name = ? WHERE people.id = ?");
}

#[test]
fn update_with_custom_key_and_literal() {
    let row = Row::new()
        .with("code", "A1")
        .with("touched", Arg::sql("now()"))
        .with("qty", 3);
    let stmt = update_row("stock", &row).pk("code").build(Dialect::Oracle).unwrap();
    assert_eq!(
        stmt.sql,
        "UPDATE stock SET touched = now(), qty = ? WHERE stock.code = ?"
    );
    assert_eq!(stmt.args(), &[Arg::from(3), Arg::from("A1")]);
}

#[test]
fn update_of_key_only_row_is_rejected() {
    let row = Row::new().with("id", 1);
    let err = update_row("t", &row).build(Dialect::Postgres).unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));
}

#[test]
fn delete_row_uses_only_the_key() {
    let row = person();
    let stmt = delete_row("people", &row).build().unwrap();
    assert_eq!(stmt.sql, "DELETE FROM people WHERE id = ?");
    assert_eq!(stmt.args(), &[Arg::from(7)]);
}

#[test]
fn delete_row_splices_literal_key_without_binding() {
    let row = Row::new().with("id", Arg::sql("(SELECT max(id) FROM people)"));
    let stmt = delete_row("people", &row).build().unwrap();
    assert_eq!(stmt.sql, "DELETE FROM people WHERE id = (SELECT max(id) FROM people)");
    assert!(stmt.args.is_empty());
}

#[test]
fn delete_rows_joins_conditions_with_and() {
    let cond = Row::new().with("kind", "x").with("flag", Arg::sql("TRUE")).with("n", 2);
    let stmt = delete_rows("t", &cond).build().unwrap();
    assert_eq!(stmt.sql, "DELETE FROM t WHERE kind = ? AND flag = TRUE AND n = ?");
    assert_eq!(stmt.args(), &[Arg::from("x"), Arg::from(2)]);
}

#[test]
fn delete_rows_without_condition_deletes_all() {
    let stmt = delete_rows("t", &Row::new()).build().unwrap();
    assert_eq!(stmt.sql, "DELETE FROM t");
    assert!(stmt.args.is_empty());
}

#[test]
fn unsafe_identifiers_are_rejected() {
    let row = person();
    assert!(insert_row("t; DROP TABLE t", &row).build(Dialect::Postgres).is_err());
    let bad = Row::new().with("a = 1 OR 1", 1);
    assert!(delete_rows("t", &bad).build().is_err());
}

#[test]
fn order_by_prefers_explicit_sorts() {
    let sorts = [("name", SortOrder::Asc), ("id", SortOrder::Desc)];
    let defaults = [("id", SortOrder::Asc)];
    assert_eq!(
        order_by("SELECT * FROM t", &sorts, &defaults).unwrap(),
        "SELECT * FROM t ORDER BY name ASC, id DESC"
    );
    assert_eq!(
        order_by("SELECT * FROM t", &[], &defaults).unwrap(),
        "SELECT * FROM t ORDER BY id ASC"
    );
    assert_eq!(
        order_by::<&str>("SELECT * FROM t", &[], &[]).unwrap(),
        "SELECT * FROM t"
    );
    assert!(order_by("SELECT 1", &[("1; --", SortOrder::Asc)], &[]).is_err());
}

#[test]
fn sort_order_parses_case_insensitively() {
    assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
    assert!("sideways".parse::<SortOrder>().is_err());
}

#[test]
fn next_id_per_dialect() {
    assert_eq!(
        next_id_sql(Dialect::Oracle, "people_seq").unwrap(),
        "SELECT people_seq.nextval n FROM dual"
    );
    assert_eq!(
        next_id_sql(Dialect::Postgres, "people_seq").unwrap(),
        "SELECT nextval('people_seq') n"
    );
    assert!(next_id_sql(Dialect::Postgres, "x'); DROP").is_err());
}

#[test]
fn next_id_escapes_quotes_in_sequence_literal() {
    assert_eq!(
        next_id_sql(Dialect::Postgres, "\"order'seq\"").unwrap(),
        "SELECT nextval('\"order''seq\"') n"
    );
}
