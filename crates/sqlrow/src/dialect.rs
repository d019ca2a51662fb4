//! SQL dialects.

use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The SQL dialect a statement is generated for.
///
/// The two dialects differ in row insertion (`FROM DUAL` vs `RETURNING *`),
/// upsert (`MERGE` vs a writable CTE) and sequence access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Oracle-like: `DUAL`, `MERGE INTO`, `seq.nextval`
    Oracle,
    /// PostgreSQL-like: `RETURNING`, writable CTEs, `nextval('seq')`
    #[default]
    Postgres,
}

impl Dialect {
    #[inline]
    #[must_use]
    pub const fn is_oracle_like(&self) -> bool {
        matches!(self, Dialect::Oracle)
    }

    #[inline]
    #[must_use]
    pub const fn is_postgres_like(&self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Parse a dialect name (case-insensitive).
    ///
    /// Accepts `oracle`/`ora` and `postgres`/`postgresql`/`pg`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("oracle") || s.eq_ignore_ascii_case("ora") {
            Some(Dialect::Oracle)
        } else if s.eq_ignore_ascii_case("postgres")
            || s.eq_ignore_ascii_case("postgresql")
            || s.eq_ignore_ascii_case("pg")
        {
            Some(Dialect::Postgres)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Dialect::Oracle => "oracle",
            Dialect::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = DbError;

    fn from_str(s: &str) -> DbResult<Self> {
        Dialect::parse(s).ok_or_else(|| DbError::validation(format!("unknown dialect '{s}'")))
    }
}
