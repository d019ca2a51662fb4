//! The statement facade.
//!
//! [`Db`] normalizes every template, builds row statements for the
//! transport's current dialect, logs, and hands the canonical statement to
//! its [`Transport`].
//!
//! ```ignore
//! use sqlrow::{Db, Row, builder, named};
//!
//! let db = Db::new(transport);
//! let users = db.query("SELECT * FROM users WHERE status = :status", &named! { "status" => "active" }).await?;
//!
//! let row = Row::new().with("id", 7).with("name", "Jo");
//! db.insert_row(builder::insert_row("users", &row)).await?;
//! ```

use crate::arg::{Arg, SqlType};
use crate::builder::{DeleteRow, DeleteRows, InsertRow, UpdateRow, next_id_sql};
use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::params::{Params, normalize};
use crate::row::{Column, Row};
use crate::template::Statement;
use crate::trace;
use crate::transport::{
    CallOutcome, ColumnMeta, Page, Record, ResultSet, TransactionHandle, Transactional, Transport,
};
use crate::upsert::MergeRow;
use crate::value::Value;
use serde::{Deserialize, Deserializer, Serialize};
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;

/// Result of writing one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RowOutcome {
    /// PostgreSQL: the row as stored (`RETURNING *`), or `None` when nothing was written.
    Returned(Option<Record>),
    /// Oracle, and deletes: the number of affected rows.
    Affected(u64),
    /// The change carried no state.
    Skipped,
}

impl RowOutcome {
    /// Whether any row was written.
    pub fn is_written(&self) -> bool {
        match self {
            RowOutcome::Returned(row) => row.is_some(),
            RowOutcome::Affected(n) => *n > 0,
            RowOutcome::Skipped => false,
        }
    }

    pub fn returned(&self) -> Option<&Record> {
        match self {
            RowOutcome::Returned(row) => row.as_ref(),
            _ => None,
        }
    }
}

/// Edit state of a row in a change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowState {
    New,
    Edit,
    Remove,
    #[default]
    None,
}

/// One row of a change set.
///
/// On the wire the state rides in the row itself as `_state`:
/// `{"_state": "edit", "id": 3, "name": "Jo"}`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowChange {
    pub state: RowState,
    pub row: Row,
}

impl RowChange {
    pub const STATE_KEY: &'static str = "_state";

    pub fn new(state: RowState, row: Row) -> Self {
        Self { state, row }
    }

    pub fn from_json(json: serde_json::Value) -> DbResult<Self> {
        let serde_json::Value::Object(mut map) = json else {
            return Err(DbError::validation("a change must be a JSON object"));
        };
        let state = match map.shift_remove(Self::STATE_KEY) {
            None | Some(serde_json::Value::Null) => RowState::None,
            Some(state) => serde_json::from_value(state)
                .map_err(|e| DbError::validation(format!("invalid {}: {e}", Self::STATE_KEY)))?,
        };
        let row = Row::from_json(serde_json::Value::Object(map))?;
        Ok(Self { state, row })
    }
}

impl<'de> Deserialize<'de> for RowChange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        RowChange::from_json(json).map_err(serde::de::Error::custom)
    }
}

/// Statement facade over a [`Transport`].
#[derive(Debug, Clone)]
pub struct Db<T> {
    transport: T,
    config: Arc<DbConfig>,
}

impl<T: Transport> Db<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, DbConfig::default())
    }

    pub fn with_config(transport: T, config: DbConfig) -> Self {
        Self {
            transport,
            config: Arc::new(config),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    async fn timed<O>(&self, fut: impl Future<Output = DbResult<O>>) -> DbResult<O> {
        match self.config.query_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| DbError::Timeout(limit))?,
            None => fut.await,
        }
    }

    fn prepare<'p>(
        &self,
        op: &'static str,
        sql: &str,
        params: impl Into<Params<'p>>,
    ) -> DbResult<Statement> {
        Ok(self.stage(op, normalize(sql, params)?))
    }

    /// Apply the configured JSON type to untagged JSON and log the statement.
    fn stage(&self, op: &'static str, mut stmt: Statement) -> Statement {
        let untagged_json = |arg: &Arg| matches!(arg, Arg::Raw(Value::Json(_)));
        if self.config.json_type == SqlType::Json && stmt.args.iter().any(untagged_json) {
            stmt.args = stmt
                .args
                .into_vec()
                .into_iter()
                .map(|arg| match arg {
                    Arg::Raw(json @ Value::Json(_)) => Arg::typed(SqlType::Json, json),
                    other => other,
                })
                .collect();
        }
        trace::statement(&self.config, op, self.transport.dialect(), &stmt);
        stmt
    }

    /// Run a query and return all rows.
    pub async fn query<'p>(&self, sql: &str, params: impl Into<Params<'p>>) -> DbResult<ResultSet> {
        let stmt = self.prepare("query", sql, params)?;
        self.timed(self.transport.query(&stmt)).await
    }

    /// Run a query and return one page of rows.
    pub async fn page_query<'p>(
        &self,
        sql: &str,
        params: impl Into<Params<'p>>,
        page: Page,
    ) -> DbResult<ResultSet> {
        let stmt = self.prepare("page_query", sql, params)?;
        self.timed(self.transport.page_query(&stmt, page)).await
    }

    /// The first row, if any.
    pub async fn query_row<'p>(
        &self,
        sql: &str,
        params: impl Into<Params<'p>>,
    ) -> DbResult<Option<Record>> {
        let stmt = self.prepare("query_row", sql, params)?;
        let rows = self.timed(self.transport.query(&stmt)).await?;
        Ok(rows.into_first())
    }

    /// The first column of the first row, if any.
    pub async fn query_scalar<'p>(
        &self,
        sql: &str,
        params: impl Into<Params<'p>>,
    ) -> DbResult<Option<Value>> {
        let stmt = self.prepare("query_scalar", sql, params)?;
        let rows = self.timed(self.transport.query(&stmt)).await?;
        Ok(rows
            .into_first()
            .and_then(|row| row.into_iter().next().map(|(_, v)| v)))
    }

    /// Run a statement and return the number of affected rows.
    pub async fn execute<'p>(&self, sql: &str, params: impl Into<Params<'p>>) -> DbResult<u64> {
        let stmt = self.prepare("execute", sql, params)?;
        self.timed(self.transport.execute(&stmt)).await
    }

    /// Call a stored procedure, e.g. `CALL pkg.proc(?, ?)`.
    ///
    /// Output parameters are passed as [`Arg::out`](crate::Arg::out) or
    /// [`Arg::out_cursor`](crate::Arg::out_cursor).
    pub async fn call<'p>(&self, sql: &str, params: impl Into<Params<'p>>) -> DbResult<CallOutcome> {
        let stmt = self.prepare("call", sql, params)?;
        self.timed(self.transport.call(&stmt)).await
    }

    /// Stream rows into `visit`; return [`ControlFlow::Break`] to stop early.
    pub async fn travel<'p, F>(
        &self,
        sql: &str,
        params: impl Into<Params<'p>>,
        visit: F,
    ) -> DbResult<u64>
    where
        F: FnMut(&Record, &[ColumnMeta]) -> ControlFlow<()> + Send,
    {
        let stmt = self.prepare("travel", sql, params)?;
        self.timed(self.transport.travel(&stmt, visit)).await
    }

    /// Next value of a sequence.
    pub async fn next_id(&self, sequence: &str) -> DbResult<Value> {
        let stmt = self.stage(
            "next_id",
            Statement::raw(next_id_sql(self.transport.dialect(), sequence)?),
        );
        let row = self
            .timed(self.transport.query(&stmt))
            .await?
            .into_first()
            .ok_or_else(|| DbError::not_found(format!("sequence {sequence} returned no row")))?;
        row.get("n")
            .or_else(|| row.values().next())
            .cloned()
            .ok_or_else(|| DbError::not_found(format!("sequence {sequence} returned no value")))
    }

    /// Run a row write that returns the stored row on PostgreSQL.
    async fn write_row(&self, op: &'static str, stmt: Statement) -> DbResult<RowOutcome> {
        let stmt = self.stage(op, stmt);
        if self.transport.is_postgres_like() {
            let rows = self.timed(self.transport.query(&stmt)).await?;
            Ok(RowOutcome::Returned(rows.into_first()))
        } else {
            let n = self.timed(self.transport.execute(&stmt)).await?;
            Ok(RowOutcome::Affected(n))
        }
    }

    /// Insert one row unless its primary key already exists.
    pub async fn insert_row(&self, insert: InsertRow<'_>) -> DbResult<RowOutcome> {
        let stmt = insert.build_with_pk(self.transport.dialect(), &self.config.default_pk_column)?;
        self.write_row("insert_row", stmt).await
    }

    /// Update one row by primary key.
    pub async fn update_row(&self, update: UpdateRow<'_>) -> DbResult<RowOutcome> {
        let stmt = update.build_with_pk(self.transport.dialect(), &self.config.default_pk_column)?;
        self.write_row("update_row", stmt).await
    }

    /// Update or insert one row keyed by its unique columns.
    pub async fn merge_row(&self, merge: MergeRow<'_>) -> DbResult<u64> {
        let stmt = self.stage("merge_row", merge.build(self.transport.dialect())?);
        self.timed(self.transport.execute(&stmt)).await
    }

    /// Delete one row by primary key.
    pub async fn delete_row(&self, delete: DeleteRow<'_>) -> DbResult<u64> {
        let stmt = self.stage(
            "delete_row",
            delete.build_with_pk(&self.config.default_pk_column)?,
        );
        self.timed(self.transport.execute(&stmt)).await
    }

    /// Delete every row matching the condition.
    pub async fn delete_rows(&self, delete: DeleteRows<'_>) -> DbResult<u64> {
        let stmt = self.stage("delete_rows", delete.build()?);
        self.timed(self.transport.execute(&stmt)).await
    }

    /// Apply a change set in order, without opening a transaction.
    ///
    /// The first failing row aborts the rest; its error is wrapped in
    /// [`DbError::Change`] with the table and row index.
    pub async fn apply_each(
        &self,
        table: &str,
        columns: Option<&[Column]>,
        changes: &[RowChange],
        pk: Option<&str>,
    ) -> DbResult<Vec<RowOutcome>> {
        let mut outcomes = Vec::with_capacity(changes.len());
        for (index, change) in changes.iter().enumerate() {
            let outcome = self
                .apply_one(table, columns, change, pk)
                .await
                .map_err(|source| DbError::Change {
                    table: table.to_string(),
                    index,
                    source: Box::new(source),
                })?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn apply_one(
        &self,
        table: &str,
        columns: Option<&[Column]>,
        change: &RowChange,
        pk: Option<&str>,
    ) -> DbResult<RowOutcome> {
        match change.state {
            RowState::New => {
                let mut insert = InsertRow::new(table, &change.row);
                if let Some(cols) = columns {
                    insert = insert.columns(cols);
                }
                if let Some(pk) = pk {
                    insert = insert.pk(pk);
                }
                self.insert_row(insert).await
            }
            RowState::Edit => {
                let mut update = UpdateRow::new(table, &change.row);
                if let Some(cols) = columns {
                    update = update.columns(cols);
                }
                if let Some(pk) = pk {
                    update = update.pk(pk);
                }
                self.update_row(update).await
            }
            RowState::Remove => {
                let mut delete = DeleteRow::new(table, &change.row);
                if let Some(pk) = pk {
                    delete = delete.pk(pk);
                }
                self.delete_row(delete).await.map(RowOutcome::Affected)
            }
            RowState::None => Ok(RowOutcome::Skipped),
        }
    }
}

impl<T: Transactional> Db<T> {
    /// Open a transaction; statements on the returned `Db` run inside it.
    pub async fn begin(&self) -> DbResult<Db<T::Tx<'_>>> {
        let tx = self.transport.begin().await?;
        tracing::debug!(target: "sqlrow.sql", op = "begin", "transaction started");
        Ok(Db {
            transport: tx,
            config: Arc::clone(&self.config),
        })
    }

    /// Apply a change set inside one transaction.
    ///
    /// Commits when every row succeeds, otherwise rolls back and returns the
    /// first failure.
    pub async fn apply_changes(
        &self,
        table: &str,
        columns: Option<&[Column]>,
        changes: &[RowChange],
        pk: Option<&str>,
    ) -> DbResult<Vec<RowOutcome>> {
        crate::transaction!(self, tx, {
            tx.apply_each(table, columns, changes, pk).await
        })
    }
}

impl<T: Transport + TransactionHandle> Db<T> {
    pub async fn commit(&self) -> DbResult<()> {
        self.transport.commit().await?;
        tracing::debug!(target: "sqlrow.sql", op = "commit", "transaction committed");
        Ok(())
    }

    pub async fn rollback(&self) -> DbResult<()> {
        self.transport.rollback().await?;
        tracing::debug!(target: "sqlrow.sql", op = "rollback", "transaction rolled back");
        Ok(())
    }

    pub async fn close(&self) -> DbResult<()> {
        self.transport.close().await
    }
}
