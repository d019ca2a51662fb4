use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::row::check_ident;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort direction for [`order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SortOrder {
    type Err = DbError;

    fn from_str(s: &str) -> DbResult<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortOrder::Desc)
        } else {
            Err(DbError::validation(format!("unknown sort direction '{s}'")))
        }
    }
}

/// Append ` ORDER BY col dir, ...` to `sql`.
///
/// `sorts` wins over `default_sorts` unless it is empty; with neither, `sql`
/// is returned unchanged. Sort keys are validated as identifiers since they
/// usually come from request parameters.
pub fn order_by<S: AsRef<str>>(
    sql: &str,
    sorts: &[(S, SortOrder)],
    default_sorts: &[(S, SortOrder)],
) -> DbResult<String> {
    let sorts = if sorts.is_empty() { default_sorts } else { sorts };
    if sorts.is_empty() {
        return Ok(sql.to_string());
    }

    let mut parts = Vec::with_capacity(sorts.len());
    for (column, order) in sorts {
        let column = column.as_ref();
        check_ident(column)?;
        parts.push(format!("{column} {order}"));
    }
    Ok(format!("{sql} ORDER BY {}", parts.join(", ")))
}

/// SQL fetching the next value of a sequence as column `n`.
pub fn next_id_sql(dialect: Dialect, sequence: &str) -> DbResult<String> {
    check_ident(sequence)?;
    Ok(match dialect {
        Dialect::Oracle => format!("SELECT {sequence}.nextval n FROM dual"),
        Dialect::Postgres => format!("SELECT nextval('{}') n", sequence.replace('\'', "''")),
    })
}
