use super::MergePlan;
use crate::arg::ArgList;
use crate::row::bind_column;
use crate::template::Statement;

/// Writable CTE upsert.
///
/// ```text
/// WITH nv (u) AS (VALUES (?)),
///      upsert AS (UPDATE t t SET c = ? FROM nv WHERE t.u = nv.u RETURNING t.*)
/// INSERT INTO t (id, u, c) SELECT ?, nv.u, ? FROM nv
///  WHERE NOT EXISTS (SELECT 1 FROM upsert LIMIT 1)
/// ```
///
/// Arguments bind unique values, update values, then insert values; unique
/// columns in the insert read `nv` instead of binding again.
pub(super) fn build(plan: &MergePlan<'_>) -> Statement {
    let mut args = ArgList::new();

    let nv_names: Vec<&str> = plan.unique.iter().map(|col| col.name.as_str()).collect();
    let nv_values: Vec<String> = plan
        .unique
        .iter()
        .map(|col| bind_column(plan.row, col, &mut args))
        .collect();

    let set: Vec<String> = if plan.updates.is_empty() {
        // keep the UPDATE valid so a match still suppresses the insert
        nv_names.iter().map(|name| format!("{name} = nv.{name}")).collect()
    } else {
        plan.updates
            .iter()
            .map(|col| format!("{} = {}", col.name, bind_column(plan.row, col, &mut args)))
            .collect()
    };

    let matches: Vec<String> = nv_names
        .iter()
        .map(|name| format!("t.{name} = nv.{name}"))
        .collect();

    let names: Vec<&str> = plan.inserts.iter().map(|col| col.name.as_str()).collect();
    let values: Vec<String> = plan
        .inserts
        .iter()
        .map(|col| {
            if nv_names.contains(&col.name.as_str()) {
                format!("nv.{}", col.name)
            } else {
                bind_column(plan.row, col, &mut args)
            }
        })
        .collect();

    let sql = format!(
        "WITH nv ({}) AS (VALUES ({})), upsert AS (UPDATE {table} t SET {} FROM nv WHERE {} RETURNING t.*) \
         INSERT INTO {table} ({}) SELECT {} FROM nv WHERE NOT EXISTS (SELECT 1 FROM upsert LIMIT 1)",
        nv_names.join(", "),
        nv_values.join(", "),
        set.join(", "),
        matches.join(" AND "),
        names.join(", "),
        values.join(", "),
        table = plan.table,
    );

    Statement { sql, args }
}
