use super::decode::{column_meta, decode_row};
use super::encode::param_type;
use super::placeholder::render_placeholders;
use crate::arg::{Arg, SqlType};
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::template::Statement;
use crate::transport::{
    CallOutcome, ColumnMeta, Page, Record, ResultSet, TransactionHandle, Transactional, Transport,
};
use crate::value::Value;
use futures_util::{TryStreamExt, pin_mut};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_postgres::Client;
use tokio_postgres::types::{ToSql, Type};

/// Anything that hands out a `tokio_postgres::Client`.
pub trait PgConnection: Send + Sync {
    fn client(&self) -> &Client;
}

impl PgConnection for Client {
    fn client(&self) -> &Client {
        self
    }
}

#[cfg(feature = "pool")]
impl PgConnection for deadpool_postgres::Client {
    fn client(&self) -> &Client {
        self
    }
}

impl<C: PgConnection + ?Sized> PgConnection for &C {
    fn client(&self) -> &Client {
        (**self).client()
    }
}

impl<C: PgConnection + ?Sized> PgConnection for Arc<C> {
    fn client(&self) -> &Client {
        (**self).client()
    }
}

/// PostgreSQL transport.
///
/// Canonical `?` placeholders are rendered as `$n` and each parameter is
/// declared with the type its [`Arg`] carries, leaving untyped text and
/// `NULL` for the server to infer.
///
/// ```ignore
/// let (client, connection) = tokio_postgres::connect(&url, NoTls).await?;
/// tokio::spawn(connection);
/// let db = sqlrow::Db::new(PgTransport::new(client));
/// ```
#[derive(Debug, Clone)]
pub struct PgTransport<C> {
    conn: C,
}

impl<C: PgConnection> PgTransport<C> {
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn into_inner(self) -> C {
        self.conn
    }
}

impl<C: PgConnection> Transport for PgTransport<C> {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn query(&self, stmt: &Statement) -> DbResult<ResultSet> {
        query(self.conn.client(), stmt).await
    }

    async fn page_query(&self, stmt: &Statement, page: Page) -> DbResult<ResultSet> {
        query(self.conn.client(), &paged(stmt, page)).await
    }

    async fn execute(&self, stmt: &Statement) -> DbResult<u64> {
        execute(self.conn.client(), stmt).await
    }

    async fn call(&self, stmt: &Statement) -> DbResult<CallOutcome> {
        call(self.conn.client(), stmt).await
    }

    async fn travel<F>(&self, stmt: &Statement, visit: F) -> DbResult<u64>
    where
        F: FnMut(&Record, &[ColumnMeta]) -> ControlFlow<()> + Send,
    {
        travel(self.conn.client(), stmt, visit).await
    }
}

impl<C: PgConnection> Transactional for PgTransport<C> {
    type Tx<'a>
        = PgTx<'a>
    where
        Self: 'a;

    async fn begin(&self) -> DbResult<PgTx<'_>> {
        let client = self.conn.client();
        client
            .batch_execute("BEGIN")
            .await
            .map_err(DbError::from_db_error)?;
        Ok(PgTx {
            client,
            finished: AtomicBool::new(false),
        })
    }
}

/// An open transaction on one connection.
///
/// Statements issued through it share the connection with its
/// [`PgTransport`]; do not use the transport directly until the transaction
/// is closed.
#[derive(Debug)]
pub struct PgTx<'a> {
    client: &'a Client,
    finished: AtomicBool,
}

impl PgTx<'_> {
    async fn finish(&self, command: &str) -> DbResult<()> {
        if self.finished.swap(true, Ordering::AcqRel) {
            return Err(DbError::Other(format!(
                "{command} on a transaction that is already finished"
            )));
        }
        self.client
            .batch_execute(command)
            .await
            .map_err(DbError::from_db_error)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}

impl Transport for PgTx<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn query(&self, stmt: &Statement) -> DbResult<ResultSet> {
        query(self.client, stmt).await
    }

    async fn page_query(&self, stmt: &Statement, page: Page) -> DbResult<ResultSet> {
        query(self.client, &paged(stmt, page)).await
    }

    async fn execute(&self, stmt: &Statement) -> DbResult<u64> {
        execute(self.client, stmt).await
    }

    async fn call(&self, stmt: &Statement) -> DbResult<CallOutcome> {
        call(self.client, stmt).await
    }

    async fn travel<F>(&self, stmt: &Statement, visit: F) -> DbResult<u64>
    where
        F: FnMut(&Record, &[ColumnMeta]) -> ControlFlow<()> + Send,
    {
        travel(self.client, stmt, visit).await
    }
}

impl TransactionHandle for PgTx<'_> {
    async fn commit(&self) -> DbResult<()> {
        self.finish("COMMIT").await
    }

    async fn rollback(&self) -> DbResult<()> {
        self.finish("ROLLBACK").await
    }

    async fn close(&self) -> DbResult<()> {
        if self.is_finished() {
            return Ok(());
        }
        self.finish("ROLLBACK").await
    }
}

fn bind_params(args: &[Arg]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|arg| arg as &(dyn ToSql + Sync)).collect()
}

async fn prepare(client: &Client, stmt: &Statement) -> DbResult<tokio_postgres::Statement> {
    let expected = stmt.placeholder_count();
    if expected != stmt.args.len() {
        return Err(DbError::validation(format!(
            "statement has {expected} placeholders but {} arguments",
            stmt.args.len()
        )));
    }
    if let Some(literal) = stmt.args.iter().find_map(Arg::as_literal) {
        return Err(DbError::validation(format!(
            "literal SQL `{literal}` cannot be bound as a parameter"
        )));
    }
    let types: Vec<Type> = stmt.args.iter().map(param_type).collect();
    client
        .prepare_typed(&render_placeholders(&stmt.sql), &types)
        .await
        .map_err(DbError::from_db_error)
}

async fn query(client: &Client, stmt: &Statement) -> DbResult<ResultSet> {
    let prepared = prepare(client, stmt).await?;
    let params = bind_params(stmt.args.as_slice());
    let rows = client
        .query(&prepared, &params)
        .await
        .map_err(DbError::from_db_error)?;
    Ok(ResultSet {
        columns: column_meta(prepared.columns()),
        rows: rows.iter().map(decode_row).collect::<DbResult<_>>()?,
    })
}

async fn execute(client: &Client, stmt: &Statement) -> DbResult<u64> {
    let prepared = prepare(client, stmt).await?;
    let params = bind_params(stmt.args.as_slice());
    client
        .execute(&prepared, &params)
        .await
        .map_err(DbError::from_db_error)
}

/// `CALL` returns INOUT values as a single row; refcursor outputs are
/// fetched by name and must be read inside the same transaction.
async fn call(client: &Client, stmt: &Statement) -> DbResult<CallOutcome> {
    let result = query(client, stmt).await?;
    let mut outcome = CallOutcome::default();
    let Some(row) = result.rows.into_iter().next() else {
        return Ok(outcome);
    };
    for (meta, (name, value)) in result.columns.iter().zip(row) {
        match (meta.ty, value) {
            (SqlType::OutCursor, Value::Text(cursor)) => {
                let fetch = format!("FETCH ALL FROM \"{}\"", cursor.replace('"', "\"\""));
                let rows = query(client, &Statement::raw(fetch)).await?;
                outcome.cursors.insert(name, rows);
            }
            (_, value) => {
                outcome.outputs.insert(name, value);
            }
        }
    }
    Ok(outcome)
}

async fn travel<F>(client: &Client, stmt: &Statement, mut visit: F) -> DbResult<u64>
where
    F: FnMut(&Record, &[ColumnMeta]) -> ControlFlow<()> + Send,
{
    let prepared = prepare(client, stmt).await?;
    let columns = column_meta(prepared.columns());
    let params = bind_params(stmt.args.as_slice());
    let stream = client
        .query_raw(&prepared, params.iter().copied())
        .await
        .map_err(DbError::from_db_error)?;
    pin_mut!(stream);

    let mut visited = 0;
    while let Some(row) = stream.try_next().await.map_err(DbError::from_db_error)? {
        visited += 1;
        if visit(&decode_row(&row)?, &columns).is_break() {
            break;
        }
    }
    Ok(visited)
}

fn paged(stmt: &Statement, page: Page) -> Statement {
    let mut args = stmt.args.clone();
    args.push(Arg::typed(SqlType::Long, page.limit as i64));
    args.push(Arg::typed(SqlType::Long, page.start as i64));
    Statement {
        sql: format!("SELECT * FROM ({}) _page LIMIT ? OFFSET ?", stmt.sql),
        args,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn paging_wraps_the_query() {
        let stmt = Statement::new("SELECT * FROM t WHERE a = ?", args![1]);
        let paged = paged(&stmt, Page::new(20, 10));
        assert_eq!(
            paged.sql,
            "SELECT * FROM (SELECT * FROM t WHERE a = ?) _page LIMIT ? OFFSET ?"
        );
        assert_eq!(paged.args.len(), 3);
        assert_eq!(paged.placeholder_count(), 3);
        assert_eq!(paged.args.as_slice()[1].value(), Some(&Value::Int(10)));
        assert_eq!(paged.args.as_slice()[2].value(), Some(&Value::Int(20)));
    }
}
