//! Single-row upsert.
//!
//! [`MergeRow`] updates the row matching the unique columns, or inserts it
//! when none matches, in one statement:
//!
//! - Oracle: `MERGE INTO t USING dual ON (...) WHEN MATCHED ... WHEN NOT MATCHED ...`
//! - PostgreSQL: a writable CTE that runs the `UPDATE` first and inserts only
//!   when it touched nothing
//!
//! Unique columns only drive the match; they and any `pk_columns` are left
//! out of the update clause. Literal values are spliced in every clause.

mod oracle;
mod postgres;


use crate::builder::resolve_columns;
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::row::{Column, Row, check_ident};
use crate::template::Statement;

/// Start an upsert of one row keyed by `unique` columns.
pub fn merge_row<'a>(table: &'a str, row: &'a Row, unique: &'a [&'a str]) -> MergeRow<'a> {
    MergeRow::new(table, row, unique)
}

#[derive(Debug, Clone)]
pub struct MergeRow<'a> {
    table: &'a str,
    row: &'a Row,
    unique: &'a [&'a str],
    columns: Option<&'a [Column]>,
    pk_columns: &'a [&'a str],
}

impl<'a> MergeRow<'a> {
    pub fn new(table: &'a str, row: &'a Row, unique: &'a [&'a str]) -> Self {
        Self {
            table,
            row,
            unique,
            columns: None,
            pk_columns: &[],
        }
    }

    pub fn columns(mut self, columns: &'a [Column]) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Columns that are inserted but never updated.
    pub fn pk_columns(mut self, pk_columns: &'a [&'a str]) -> Self {
        self.pk_columns = pk_columns;
        self
    }

    pub fn table(&self) -> &str {
        self.table
    }

    pub fn build(&self, dialect: Dialect) -> DbResult<Statement> {
        check_ident(self.table)?;
        if self.unique.is_empty() {
            return Err(DbError::validation(format!(
                "merge into {} requires at least one unique column",
                self.table
            )));
        }
        let columns = resolve_columns(self.row, self.columns)?;
        let unique = self
            .unique
            .iter()
            .map(|name| {
                columns
                    .iter()
                    .find(|col| col.name == *name)
                    .ok_or_else(|| DbError::UnknownUniqueColumn(name.to_string()))
            })
            .collect::<DbResult<Vec<&Column>>>()?;
        let updates: Vec<&Column> = columns
            .iter()
            .filter(|col| !self.unique.contains(&col.name.as_str()))
            .filter(|col| !self.pk_columns.contains(&col.name.as_str()))
            .collect();

        let plan = MergePlan {
            table: self.table,
            row: self.row,
            unique,
            updates,
            inserts: columns.iter().collect(),
        };
        Ok(match dialect {
            Dialect::Oracle => oracle::build(&plan),
            Dialect::Postgres => postgres::build(&plan),
        })
    }
}

/// Resolved column roles shared by both strategies.
struct MergePlan<'p> {
    table: &'p str,
    row: &'p Row,
    unique: Vec<&'p Column>,
    updates: Vec<&'p Column>,
    inserts: Vec<&'p Column>,
}
