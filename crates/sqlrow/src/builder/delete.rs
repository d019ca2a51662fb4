use super::DEFAULT_PK;
use crate::arg::ArgList;
use crate::error::DbResult;
use crate::row::{Row, bind, check_ident};
use crate::template::Statement;

/// `DELETE` of one row by primary key. Other row fields are ignored.
#[derive(Debug, Clone)]
pub struct DeleteRow<'a> {
    table: &'a str,
    row: &'a Row,
    pk: Option<&'a str>,
}

impl<'a> DeleteRow<'a> {
    pub fn new(table: &'a str, row: &'a Row) -> Self {
        Self {
            table,
            row,
            pk: None,
        }
    }

    pub fn pk(mut self, pk: &'a str) -> Self {
        self.pk = Some(pk);
        self
    }

    pub fn table(&self) -> &str {
        self.table
    }

    pub fn build(&self) -> DbResult<Statement> {
        self.build_with_pk(DEFAULT_PK)
    }

    pub(crate) fn build_with_pk(&self, default_pk: &str) -> DbResult<Statement> {
        let pk = self.pk.unwrap_or(default_pk);
        check_ident(self.table)?;
        check_ident(pk)?;

        let mut args = ArgList::new();
        let slot = bind(&self.row.slot(pk), None, &mut args);
        Ok(Statement {
            sql: format!("DELETE FROM {} WHERE {} = {}", self.table, pk, slot),
            args,
        })
    }
}

/// `DELETE` of every row matching all `column = value` pairs.
///
/// An empty condition deletes every row of the table.
#[derive(Debug, Clone)]
pub struct DeleteRows<'a> {
    table: &'a str,
    cond: &'a Row,
}

impl<'a> DeleteRows<'a> {
    pub fn new(table: &'a str, cond: &'a Row) -> Self {
        Self { table, cond }
    }

    pub fn table(&self) -> &str {
        self.table
    }

    pub fn build(&self) -> DbResult<Statement> {
        check_ident(self.table)?;

        let mut args = ArgList::new();
        let mut conditions = Vec::with_capacity(self.cond.len());
        for (column, value) in self.cond.iter() {
            check_ident(column)?;
            conditions.push(format!("{} = {}", column, bind(value, None, &mut args)));
        }

        let mut sql = format!("DELETE FROM {}", self.table);
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        Ok(Statement { sql, args })
    }
}
