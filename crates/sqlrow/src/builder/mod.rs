//! Row statement builders.
//!
//! Each builder turns a [`Row`] into one canonical statement for a dialect:
//!
//! ```ignore
//! use sqlrow::{Arg, Dialect, Row, builder};
//!
//! let row = Row::new().with("id", 7).with("name", "Jo");
//! let stmt = builder::insert_row("users", &row).build(Dialect::Postgres)?;
//! assert_eq!(
//!     stmt.sql,
//!     "INSERT INTO users (id, name) SELECT ?, ? WHERE NOT EXISTS (SELECT 1 FROM users WHERE id = ?) RETURNING *"
//! );
//! ```
//!
//! Values wrapped with [`Arg::sql`](crate::Arg::sql) are spliced into the SQL
//! and never bind an argument. Columns default to the row's keys, in order. A
//! requested column missing from the row binds `NULL`.

mod delete;
mod insert;
mod order;
mod update;

#[cfg(test)]
mod tests;

pub use delete::{DeleteRow, DeleteRows};
pub use insert::InsertRow;
pub use order::{SortOrder, next_id_sql, order_by};
pub use update::UpdateRow;

use crate::error::DbResult;
use crate::row::{Column, Row, check_ident};
use std::borrow::Cow;

/// Primary key column used when none is given.
pub const DEFAULT_PK: &str = "id";

/// Start an `INSERT` for one row.
pub fn insert_row<'a>(table: &'a str, row: &'a Row) -> InsertRow<'a> {
    InsertRow::new(table, row)
}

/// Start an `UPDATE` of one row by primary key.
pub fn update_row<'a>(table: &'a str, row: &'a Row) -> UpdateRow<'a> {
    UpdateRow::new(table, row)
}

/// Start a `DELETE` of one row by primary key.
pub fn delete_row<'a>(table: &'a str, row: &'a Row) -> DeleteRow<'a> {
    DeleteRow::new(table, row)
}

/// Start a `DELETE` of every row matching all equalities in `cond`.
pub fn delete_rows<'a>(table: &'a str, cond: &'a Row) -> DeleteRows<'a> {
    DeleteRows::new(table, cond)
}

/// Explicit columns, or the row's keys.
pub(crate) fn resolve_columns<'a>(
    row: &Row,
    columns: Option<&'a [Column]>,
) -> DbResult<Cow<'a, [Column]>> {
    let columns = match columns {
        Some(cols) => Cow::Borrowed(cols),
        None => Cow::Owned(row.columns()),
    };
    for col in columns.iter() {
        check_ident(&col.name)?;
    }
    Ok(columns)
}
