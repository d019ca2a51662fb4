//! # sqlrow
//!
//! SQL statement synthesis and parameter binding for Oracle and PostgreSQL.
//!
//! ## Features
//!
//! - **Three template styles**: positional `?`, named `:name`, and embedded
//!   `{expr}` evaluated against a scope, all normalized to canonical `?` SQL
//! - **Typed arguments**: `Arg::int`, `Arg::date`, `Arg::array`, output
//!   parameters and trusted literal SQL fragments
//! - **Row statements**: idempotent insert, update and delete by key, and a
//!   single-statement upsert (`MERGE` on Oracle, writable CTE on PostgreSQL)
//! - **Transport boundary**: the [`Db`] facade runs canonical statements
//!   through any [`Transport`]; [`PgTransport`] ships for `tokio-postgres`
//!
//! ## Templates
//!
//! ```ignore
//! use sqlrow::{Db, Scope, named, args};
//!
//! // positional
//! db.query("SELECT * FROM users WHERE id = ?", &args![7]).await?;
//!
//! // named
//! db.query("SELECT * FROM users WHERE id = :id", &named! { "id" => 7 }).await?;
//!
//! // embedded expressions
//! let scope = Scope::new().with("user", serde_json::json!({ "id": 7 }));
//! db.query("SELECT * FROM users WHERE id = {user.id}", &scope).await?;
//! ```
//!
//! ## Rows
//!
//! ```ignore
//! use sqlrow::{Row, builder, upsert};
//!
//! let row = Row::new().with("id", 7).with("email", "jo@example.com").with("name", "Jo");
//! db.insert_row(builder::insert_row("users", &row)).await?;
//! db.merge_row(upsert::merge_row("users", &row, &["email"])).await?;
//! ```

pub mod arg;
pub mod builder;
pub mod config;
pub mod db;
pub mod dialect;
pub mod error;
pub mod params;
pub mod pg;
pub mod prelude;
pub mod row;
pub mod template;
pub mod transaction;
pub mod transport;
pub mod upsert;
pub mod value;

mod trace;

#[cfg(feature = "pool")]
pub mod pool;

pub use arg::{Arg, ArgList, OutParam, SqlType, TypedArg};
pub use builder::{DeleteRow, DeleteRows, InsertRow, SortOrder, UpdateRow, order_by};
pub use config::DbConfig;
pub use db::{Db, RowChange, RowOutcome, RowState};
pub use dialect::Dialect;
pub use error::{DbError, DbResult};
pub use params::{Evaluator, NamedArgs, OwnedParams, Params, Scope, normalize};
pub use pg::{PgConnection, PgTransport, PgTx, count_placeholders, render_placeholders};
pub use row::{Column, Row, check_ident};
pub use template::Statement;
pub use transport::{
    CallOutcome, ColumnMeta, Page, Record, ResultSet, TransactionHandle, Transactional, Transport,
};
pub use upsert::{MergeRow, merge_row};
pub use value::Value;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config, pooled};
