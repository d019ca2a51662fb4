use super::{DEFAULT_PK, resolve_columns};
use crate::arg::ArgList;
use crate::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::row::{Column, Row, bind, bind_column, check_ident};
use crate::template::Statement;

/// `UPDATE` of one row, matched by primary key.
///
/// Every column except the primary key is set. PostgreSQL appends
/// `RETURNING *`.
#[derive(Debug, Clone)]
pub struct UpdateRow<'a> {
    table: &'a str,
    row: &'a Row,
    columns: Option<&'a [Column]>,
    pk: Option<&'a str>,
}

impl<'a> UpdateRow<'a> {
    pub fn new(table: &'a str, row: &'a Row) -> Self {
        Self {
            table,
            row,
            columns: None,
            pk: None,
        }
    }

    pub fn columns(mut self, columns: &'a [Column]) -> Self {
        self.columns = Some(columns);
        self
    }

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

    pub(crate) fn build_with_pk(&self, dialect: Dialect, default_pk: &str) -> DbResult<Statement> {
        let pk = self.pk.unwrap_or(default_pk);
        check_ident(self.table)?;
        check_ident(pk)?;
        let columns = resolve_columns(self.row, self.columns)?;

        let mut args = ArgList::new();
        let set_parts: Vec<String> = columns
            .iter()
            .filter(|col| col.name != pk)
            .map(|col| format!("{} = {}", col.name, bind_column(self.row, col, &mut args)))
            .collect();

        // UPDATE requires SET
        if set_parts.is_empty() {
            return Err(DbError::validation(format!(
                "UPDATE {} has no columns to set besides '{}'",
                self.table, pk
            )));
        }

        let pk_ty = columns.iter().find(|c| c.name == pk).and_then(|c| c.ty);
        let pk_slot = bind(&self.row.slot(pk), pk_ty, &mut args);

        let mut sql = format!(
            "UPDATE {} SET {} WHERE {}.{} = {}",
            self.table,
            set_parts.join(", "),
            self.table,
            pk,
            pk_slot
        );
        if dialect.is_postgres_like() {
            sql.push_str(" RETURNING *");
        }

        Ok(Statement { sql, args })
    }
}
