//! Common imports:
//!
//! ```ignore
//! use sqlrow::prelude::*;
//! ```

pub use crate::{
    Arg, Column, Db, DbConfig, DbError, DbResult, Dialect, PgTransport, Row, RowChange,
    RowOutcome, RowState, Scope, SqlType, Statement, Transactional, Transport, Value, args,
    named,
};

#[cfg(feature = "pool")]
pub use crate::{create_pool, pooled};
