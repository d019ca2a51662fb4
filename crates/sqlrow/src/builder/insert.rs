use super::{DEFAULT_PK, resolve_columns};
use crate::arg::{Arg, ArgList};
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::row::{Column, Row, bind, bind_column, check_ident};
use crate::template::Statement;

/// `INSERT` of one row, skipped when the primary key already exists.
///
/// When the row carries a concrete primary key value (not `NULL`, not a
/// literal), the insert is guarded by `WHERE NOT EXISTS (SELECT 1 FROM t
/// WHERE pk = ?)` so running it twice inserts once. Oracle selects the
/// values `FROM DUAL`; PostgreSQL appends `RETURNING *`.
#[derive(Debug, Clone)]
pub struct InsertRow<'a> {
    table: &'a str,
    row: &'a Row,
    columns: Option<&'a [Column]>,
    pk: Option<&'a str>,
}

impl<'a> InsertRow<'a> {
    pub fn new(table: &'a str, row: &'a Row) -> Self {
        Self {
            table,
            row,
            columns: None,
            pk: None,
        }
    }

    /// Insert only these columns, in this order.
    pub fn columns(mut self, columns: &'a [Column]) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Primary key column for the existence guard (default `id`).
    pub fn pk(mut self, pk: &'a str) -> Self {
        self.pk = Some(pk);
        self
    }

    pub fn table(&self) -> &str {
        self.table
    }

    pub fn build(&self, dialect: Dialect) -> DbResult<Statement> {
        self.build_with_pk(dialect, DEFAULT_PK)
    }

    /// Build using `default_pk` unless a primary key was set explicitly.
    pub(crate) fn build_with_pk(&self, dialect: Dialect, default_pk: &str) -> DbResult<Statement> {
        let pk = self.pk.unwrap_or(default_pk);
        check_ident(self.table)?;
        check_ident(pk)?;
        let columns = resolve_columns(self.row, self.columns)?;
        if columns.is_empty() {
            return Err(DbError::validation(format!(
                "INSERT INTO {} requires at least one column",
                self.table
            )));
        }

        let mut args = ArgList::new();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        let values: Vec<String> = columns
            .iter()
            .map(|col| bind_column(self.row, col, &mut args))
            .collect();

        let mut sql = format!(
            "INSERT INTO {} ({}) SELECT {}",
            self.table,
            names.join(", "),
            values.join(", ")
        );
        if dialect.is_oracle_like() {
            sql.push_str(" FROM DUAL");
        }

        if let Some(pk_value) = self.row.get(pk).filter(|v| is_concrete(v)) {
            let pk_ty = columns.iter().find(|c| c.name == pk).and_then(|c| c.ty);
            let slot = bind(pk_value, pk_ty, &mut args);
            sql.push_str(&format!(
                " WHERE NOT EXISTS (SELECT 1 FROM {} WHERE {} = {})",
                self.table, pk, slot
            ));
        }

        if dialect.is_postgres_like() {
            sql.push_str(" RETURNING *");
        }

        Ok(Statement { sql, args })
    }
}

/// A key value that can be compared against existing rows.
fn is_concrete(value: &Arg) -> bool {
    !value.is_null() && !value.is_literal() && !matches!(value, Arg::Out(_))
}
