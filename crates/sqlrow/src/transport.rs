//! The transport boundary.
//!
//! A [`Transport`] runs canonical statements (`?` placeholders, positional
//! [`Arg`](crate::Arg)s) against a database and reports its [`Dialect`]. The
//! facade never caches the dialect; it asks on every call.

use crate::dialect::Dialect;
use crate::error::DbResult;
use crate::arg::SqlType;
use crate::template::Statement;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::ops::ControlFlow;

/// One result row, keyed by column name in select order.
pub type Record = IndexMap<String, Value>;

/// Name and type of a result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SqlType,
    /// Database type name, e.g. `int4`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub db_type: String,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, ty: SqlType) -> Self {
        Self {
            name: name.into(),
            ty,
            db_type: String::new(),
        }
    }
}

/// Rows returned by a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Record>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&Record> {
        self.rows.first()
    }

    pub fn into_first(self) -> Option<Record> {
        self.rows.into_iter().next()
    }
}

/// A window into a query's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Rows to skip.
    pub start: u64,
    /// Maximum rows to return.
    pub limit: u64,
}

impl Page {
    pub fn new(start: u64, limit: u64) -> Self {
        Self { start, limit }
    }
}

/// Output of a procedure call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallOutcome {
    /// Output parameters by name.
    pub outputs: Record,
    /// Rows fetched from cursor outputs, by parameter name.
    pub cursors: IndexMap<String, ResultSet>,
}

/// Runs canonical statements.
pub trait Transport: Send + Sync {
    fn dialect(&self) -> Dialect;

    fn is_oracle_like(&self) -> bool {
        self.dialect().is_oracle_like()
    }

    fn is_postgres_like(&self) -> bool {
        self.dialect().is_postgres_like()
    }

    /// Run a query and return all rows.
    fn query(&self, stmt: &Statement) -> impl Future<Output = DbResult<ResultSet>> + Send;

    /// Run a query and return one page of its rows.
    fn page_query(
        &self,
        stmt: &Statement,
        page: Page,
    ) -> impl Future<Output = DbResult<ResultSet>> + Send;

    /// Run a statement and return the number of affected rows.
    fn execute(&self, stmt: &Statement) -> impl Future<Output = DbResult<u64>> + Send;

    /// Call a stored procedure.
    fn call(&self, stmt: &Statement) -> impl Future<Output = DbResult<CallOutcome>> + Send;

    /// Stream rows into `visit` until it breaks or the rows run out.
    ///
    /// Returns the number of rows visited.
    fn travel<F>(&self, stmt: &Statement, visit: F) -> impl Future<Output = DbResult<u64>> + Send
    where
        F: FnMut(&Record, &[ColumnMeta]) -> ControlFlow<()> + Send;
}

/// Finishes a transaction begun by [`Transactional::begin`].
pub trait TransactionHandle: Send + Sync {
    fn commit(&self) -> impl Future<Output = DbResult<()>> + Send;

    fn rollback(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Release the transaction, rolling back if it is still open.
    fn close(&self) -> impl Future<Output = DbResult<()>> + Send;
}

/// A transport that can open transactions.
pub trait Transactional: Transport {
    type Tx<'a>: Transport + TransactionHandle
    where
        Self: 'a;

    fn begin(&self) -> impl Future<Output = DbResult<Self::Tx<'_>>> + Send;
}
