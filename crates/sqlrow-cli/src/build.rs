use crate::cli::{BuildArgs, BuildKind};
use anyhow::Context;
use sqlrow::builder::{DeleteRow, InsertRow, UpdateRow};
use sqlrow::{Column, Row, Statement, merge_row};

pub fn run(args: &BuildArgs) -> anyhow::Result<serde_json::Value> {
    let json: serde_json::Value = serde_json::from_str(&args.row).context("--row is not valid JSON")?;
    let row = Row::from_json(json)?;
    let columns = args
        .columns
        .as_deref()
        .map(Column::parse_list)
        .transpose()?;

    let stmt = build(args, &row, columns.as_deref())
        .with_context(|| format!("cannot build {:?} for {}", args.kind, args.table))?;
    tracing::debug!(
        dialect = %args.dialect,
        sql = %stmt.sql,
        param_count = stmt.args.len(),
        "built row statement"
    );
    Ok(serde_json::to_value(&stmt)?)
}

fn build(args: &BuildArgs, row: &Row, columns: Option<&[Column]>) -> sqlrow::DbResult<Statement> {
    let table = args.table.as_str();
    let pk = args.pk.as_deref();
    match args.kind {
        BuildKind::Insert => {
            let mut insert = InsertRow::new(table, row);
            if let Some(cols) = columns {
                insert = insert.columns(cols);
            }
            if let Some(pk) = pk {
                insert = insert.pk(pk);
            }
            insert.build(args.dialect)
        }
        BuildKind::Update => {
            let mut update = UpdateRow::new(table, row);
            if let Some(cols) = columns {
                update = update.columns(cols);
            }
            if let Some(pk) = pk {
                update = update.pk(pk);
            }
            update.build(args.dialect)
        }
        BuildKind::Delete => {
            let mut delete = DeleteRow::new(table, row);
            if let Some(pk) = pk {
                delete = delete.pk(pk);
            }
            delete.build()
        }
        BuildKind::Merge => {
            let unique: Vec<&str> = args.unique.iter().map(String::as_str).collect();
            let pk_columns: Vec<&str> = pk.into_iter().collect();
            let mut merge = merge_row(table, row, &unique);
            if let Some(cols) = columns {
                merge = merge.columns(cols);
            }
            if !pk_columns.is_empty() {
                merge = merge.pk_columns(&pk_columns);
            }
            merge.build(args.dialect)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlrow::Dialect;

    fn args(kind: BuildKind, row: serde_json::Value, dialect: Dialect) -> BuildArgs {
        BuildArgs {
            kind,
            table: "users".to_string(),
            row: row.to_string(),
            dialect,
            columns: None,
            pk: None,
            unique: Vec::new(),
        }
    }

    #[test]
    fn insert_on_oracle_selects_from_dual() {
        let out = run(&args(
            BuildKind::Insert,
            json!({"id": 1, "name": "Jo", "created": {"SQL": "sysdate"}}),
            Dialect::Oracle,
        ))
        .unwrap();
        assert_eq!(
            out["sql"],
            "INSERT INTO users (id, name, created) SELECT ?, ?, sysdate FROM DUAL \
             WHERE NOT EXISTS (SELECT 1 FROM users WHERE id = ?)"
        );
        assert_eq!(out["args"], json!([1, "Jo", 1]));
    }

    #[test]
    fn update_with_typed_columns_and_custom_pk() {
        let mut a = args(
            BuildKind::Update,
            json!({"uid": 9, "age": "41.7"}),
            Dialect::Postgres,
        );
        a.columns = Some("uid,age:INT".to_string());
        a.pk = Some("uid".to_string());
        let out = run(&a).unwrap();
        assert_eq!(
            out["sql"],
            "UPDATE users SET age = ? WHERE users.uid = ? RETURNING *"
        );
        assert_eq!(out["args"], json!([{"INT": "41.7"}, 9]));
    }

    #[test]
    fn merge_requires_known_unique_columns() {
        let mut a = args(BuildKind::Merge, json!({"email": "a@b"}), Dialect::Oracle);
        a.unique = vec!["phone".to_string()];
        let err = run(&a).unwrap_err();
        assert!(format!("{err:#}").contains("phone"));
    }

    #[test]
    fn merge_leaves_primary_key_out_of_update() {
        let mut a = args(
            BuildKind::Merge,
            json!({"id": 7, "email": "a@b", "name": "Jo"}),
            Dialect::Oracle,
        );
        a.unique = vec!["email".to_string()];
        a.pk = Some("id".to_string());
        let out = run(&a).unwrap();
        assert_eq!(
            out["sql"],
            "MERGE INTO users USING dual ON (email = ?) \
             WHEN MATCHED THEN UPDATE SET name = ? \
             WHEN NOT MATCHED THEN INSERT (id, email, name) VALUES (?, ?, ?)"
        );
        assert_eq!(out["args"], json!(["a@b", "Jo", 7, "a@b", "Jo"]));
    }

    #[test]
    fn delete_by_primary_key() {
        let out = run(&args(BuildKind::Delete, json!({"id": 4}), Dialect::Postgres)).unwrap();
        assert_eq!(out["sql"], "DELETE FROM users WHERE id = ?");
        assert_eq!(out["args"], json!([4]));
    }
}
