//! Round trips against a real PostgreSQL server.
//!
//! Skipped unless `DATABASE_URL` is set (a `.env` file is honored).

use sqlrow::{
    Arg, Db, DbResult, PgTransport, Row, RowOutcome, SqlType, Value, args, builder, named,
    upsert,
};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_postgres::NoTls;

async fn try_connect() -> Option<Db<PgTransport<tokio_postgres::Client>>> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping");
            return None;
        }
    };
    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .expect("connect to DATABASE_URL");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("connection error: {e}");
        }
    });
    Some(Db::new(PgTransport::new(client)))
}

fn unique_table(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    format!("{prefix}_{}_{nanos}", std::process::id())
}

#[tokio::test]
async fn insert_row_is_idempotent() -> DbResult<()> {
    let Some(db) = try_connect().await else {
        return Ok(());
    };
    let table = unique_table("sqlrow_insert");
    db.execute(
        &format!("CREATE TEMP TABLE {table} (id BIGINT PRIMARY KEY, name TEXT, created TIMESTAMPTZ)"),
        &args![],
    )
    .await?;

    let row = Row::new()
        .with("id", 1)
        .with("name", "Jo")
        .with("created", Arg::sql("now()"));

    let first = db.insert_row(builder::insert_row(&table, &row)).await?;
    let stored = first.returned().expect("first insert returns the row");
    assert_eq!(stored.get("name"), Some(&Value::from("Jo")));
    assert!(matches!(stored.get("created"), Some(Value::TimestampTz(_))));

    let second = db.insert_row(builder::insert_row(&table, &row)).await?;
    assert_eq!(second, RowOutcome::Returned(None));

    let count = db
        .query_scalar(&format!("SELECT count(*) FROM {table}"), &args![])
        .await?;
    assert_eq!(count, Some(Value::Int(1)));
    Ok(())
}

#[tokio::test]
async fn merge_row_inserts_then_updates() -> DbResult<()> {
    let Some(db) = try_connect().await else {
        return Ok(());
    };
    let table = unique_table("sqlrow_merge");
    db.execute(
        &format!("CREATE TEMP TABLE {table} (email TEXT PRIMARY KEY, name TEXT, visits INT)"),
        &args![],
    )
    .await?;

    let row = Row::new()
        .with("email", "jo@example.com")
        .with("name", "Jo")
        .with("visits", Arg::int(1)?);
    assert_eq!(db.merge_row(upsert::merge_row(&table, &row, &["email"])).await?, 1);

    let row = row.with("name", "Joanna").with("visits", Arg::int(2)?);
    db.merge_row(upsert::merge_row(&table, &row, &["email"])).await?;

    let rows = db
        .query(
            &format!("SELECT name, visits FROM {table} WHERE email = :email"),
            &named! { "email" => "jo@example.com" },
        )
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.rows[0]["name"], Value::from("Joanna"));
    assert_eq!(rows.rows[0]["visits"], Value::Int(2));
    assert_eq!(rows.columns[1].ty, SqlType::Int);
    Ok(())
}

#[tokio::test]
async fn transactions_roll_back_on_error() -> DbResult<()> {
    let Some(db) = try_connect().await else {
        return Ok(());
    };
    let table = unique_table("sqlrow_tx");
    db.execute(&format!("CREATE TEMP TABLE {table} (id INT PRIMARY KEY)"), &args![])
        .await?;

    let result: DbResult<()> = sqlrow::transaction!(db, tx, {
        tx.execute(&format!("INSERT INTO {table} (id) VALUES (?)"), &args![1])
            .await?;
        tx.execute(&format!("INSERT INTO {table} (id) VALUES (?)"), &args![1])
            .await?;
        Ok(())
    });
    assert!(result.unwrap_err().is_unique_violation());

    let count = db
        .query_scalar(&format!("SELECT count(*) FROM {table}"), &args![])
        .await?;
    assert_eq!(count, Some(Value::Int(0)));
    Ok(())
}

#[tokio::test]
async fn paging_and_travel() -> DbResult<()> {
    let Some(db) = try_connect().await else {
        return Ok(());
    };
    let rows = db
        .page_query(
            "SELECT g AS n FROM generate_series(1, ?) g ORDER BY g",
            &args![Arg::int(10)?],
            sqlrow::Page::new(3, 2),
        )
        .await?;
    let ns: Vec<_> = rows.rows.iter().map(|r| r["n"].clone()).collect();
    assert_eq!(ns, vec![Value::Int(4), Value::Int(5)]);

    let mut total = 0;
    let visited = db
        .travel(
            "SELECT g AS n FROM generate_series(1, 5) g",
            &args![],
            |row, _| {
                total += row["n"].as_i64().unwrap_or_default();
                std::ops::ControlFlow::Continue(())
            },
        )
        .await?;
    assert_eq!(visited, 5);
    assert_eq!(total, 15);
    Ok(())
}
