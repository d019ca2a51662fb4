//! Template scanners.
//!
//! Both scanners turn a SQL template into canonical SQL where every bind
//! position is a bare `?`, paired with the arguments in placeholder order.
//!
//! - [`scan_expressions`]: `SELECT * FROM t WHERE id = {row.id}` with an evaluator
//! - [`scan_named`]: `SELECT * FROM t WHERE id = :id` with a name → argument mapping
//!
//! Templates are re-scanned on every call. Neither scanner understands SQL
//! quoting: a `:name` or `{expr}` inside a string literal is still treated as
//! a bind position.

mod expr;
mod named;

#[cfg(test)]
mod tests;

pub use expr::scan_expressions;
pub use named::{NAME_SYMBOLS, scan_named};

use crate::arg::{Arg, ArgList};
use serde::Serialize;

/// Canonical SQL plus its positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub args: ArgList,
}

impl Statement {
    pub fn new(sql: impl Into<String>, args: impl Into<ArgList>) -> Self {
        Self {
            sql: sql.into(),
            args: args.into(),
        }
    }

    /// A statement without arguments.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: ArgList::new(),
        }
    }

    /// Number of `?` placeholders outside quotes and comments.
    pub fn placeholder_count(&self) -> usize {
        crate::pg::count_placeholders(&self.sql)
    }

    pub fn args(&self) -> &[Arg] {
        self.args.as_slice()
    }
}
