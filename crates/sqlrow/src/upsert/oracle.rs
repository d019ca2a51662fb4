use super::MergePlan;
use crate::arg::ArgList;
use crate::row::bind_column;
use crate::template::Statement;

/// `MERGE INTO t USING dual ON (...)`; arguments bind match, update, insert.
pub(super) fn build(plan: &MergePlan<'_>) -> Statement {
    let mut args = ArgList::new();

    let on: Vec<String> = plan
        .unique
        .iter()
        .map(|col| format!("{} = {}", col.name, bind_column(plan.row, col, &mut args)))
        .collect();

    let set: Vec<String> = plan
        .updates
        .iter()
        .map(|col| format!("{} = {}", col.name, bind_column(plan.row, col, &mut args)))
        .collect();

    let names: Vec<&str> = plan.inserts.iter().map(|col| col.name.as_str()).collect();
    let values: Vec<String> = plan
        .inserts
        .iter()
        .map(|col| bind_column(plan.row, col, &mut args))
        .collect();

    let mut sql = format!("MERGE INTO {} USING dual ON ({})", plan.table, on.join(" AND "));
    // every column is a match key: nothing to update
    if !set.is_empty() {
        sql.push_str(" WHEN MATCHED THEN UPDATE SET ");
        sql.push_str(&set.join(", "));
    }
    sql.push_str(&format!(
        " WHEN NOT MATCHED THEN INSERT ({}) VALUES ({})",
        names.join(", "),
        values.join(", ")
    ));

    Statement { sql, args }
}
