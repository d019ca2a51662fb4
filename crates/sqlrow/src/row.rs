//! Row records and column descriptors.

use crate::arg::{Arg, ArgList, SqlType};
use crate::error::{DbError, DbResult};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// An ordered mapping of column name to argument.
///
/// Builders only read rows; iteration order is the default column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(IndexMap<String, Arg>);

impl Row {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Arg>) -> Option<Arg> {
        self.0.insert(column.into(), value.into())
    }

    pub fn get(&self, column: &str) -> Option<&Arg> {
        self.0.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arg)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The row's keys as bare column descriptors.
    pub fn columns(&self) -> Vec<Column> {
        self.keys().map(Column::from).collect()
    }

    /// Parse a JSON object into a row.
    pub fn from_json(json: serde_json::Value) -> DbResult<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(DbError::validation("a row must be a JSON object"));
        };
        map.into_iter()
            .map(|(k, v)| Arg::from_json(v).map(|arg| (k, arg)))
            .collect::<DbResult<IndexMap<_, _>>>()
            .map(Row)
    }

    /// The value bound for `column`: the row's argument, or `NULL` when absent.
    pub(crate) fn slot(&self, column: &str) -> Arg {
        self.0.get(column).cloned().unwrap_or_default()
    }
}

impl From<IndexMap<String, Arg>> for Row {
    fn from(map: IndexMap<String, Arg>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Arg>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A column name with an optional declared type.
///
/// A declared type re-tags the row value when it is bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<SqlType>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
        }
    }

    pub fn typed(name: impl Into<String>, ty: SqlType) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
        }
    }

    /// Parse a comma-separated list, `a,b:INT,c`.
    pub fn parse_list(list: &str) -> DbResult<Vec<Column>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|item| match item.split_once(':') {
                Some((name, ty)) => Ok(Column::typed(name.trim(), ty.trim().parse()?)),
                None => Ok(Column::new(item)),
            })
            .collect()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::new(name)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::new(name)
    }
}

impl From<&String> for Column {
    fn from(name: &String) -> Self {
        Column::new(name.as_str())
    }
}

impl<'de> Deserialize<'de> for Column {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bare(String),
            Described {
                name: String,
                #[serde(rename = "type", default)]
                ty: Option<SqlType>,
            },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Bare(name) => Column::new(name),
            Repr::Described { name, ty } => Column { name, ty },
        })
    }
}

/// Bind one row value, returning the SQL to place at its position.
///
/// Literals are returned verbatim and bind nothing; any other value pushes
/// one argument (re-tagged with the declared type) and returns `?`.
pub(crate) fn bind(value: &Arg, ty: Option<SqlType>, args: &mut ArgList) -> String {
    match value.as_literal() {
        Some(fragment) => fragment.to_string(),
        None => {
            args.push(value.boxed(ty));
            "?".to_string()
        }
    }
}

/// Bind the row's value for `column`.
pub(crate) fn bind_column(row: &Row, column: &Column, args: &mut ArgList) -> String {
    bind(&row.slot(&column.name), column.ty, args)
}

/// Validate a table or column name.
///
/// Accepts dotted paths of unquoted parts (`[A-Za-z_][A-Za-z0-9_$#]*`) and
/// double-quoted parts (`""` escapes a quote).
pub fn check_ident(name: &str) -> DbResult<()> {
    if name.is_empty() {
        return Err(DbError::validation("identifier cannot be empty"));
    }

    let mut chars = name.chars().peekable();
    loop {
        match chars.next() {
            Some('"') => {
                let mut len = 0;
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            len += 1;
                        }
                        Some('"') => break,
                        Some('\0') | None => {
                            return Err(DbError::validation(format!(
                                "unterminated quoted identifier in '{name}'"
                            )));
                        }
                        Some(_) => len += 1,
                    }
                }
                if len == 0 {
                    return Err(DbError::validation(format!("empty quoted identifier in '{name}'")));
                }
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#') {
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            Some(c) => {
                return Err(DbError::validation(format!(
                    "invalid character '{c}' in identifier '{name}'"
                )));
            }
            None => {
                return Err(DbError::validation(format!("trailing '.' in identifier '{name}'")));
            }
        }

        match chars.next() {
            None => return Ok(()),
            Some('.') => continue,
            Some(c) => {
                return Err(DbError::validation(format!(
                    "invalid character '{c}' in identifier '{name}'"
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_keeps_insertion_order() {
        let row = Row::new().with("b", 1).with("a", 2).with("c", 3);
        assert_eq!(row.keys().collect::<Vec<_>>(), ["b", "a", "c"]);
    }

    #[test]
    fn row_parses_wire_shapes() {
        let row = Row::from_json(json!({"id": {"SQL": "seq.nextval"}, "n": {"INT": 2.9}})).unwrap();
        assert_eq!(row.get("id"), Some(&Arg::sql("seq.nextval")));
        assert_eq!(row.get("n"), Some(&Arg::int(2).unwrap()));
        assert!(Row::from_json(json!([1])).is_err());
    }

    #[test]
    fn json_rows_keep_document_order() {
        let json: serde_json::Value = serde_json::from_str(r#"{"name":"Jo","id":1,"age":3}"#).unwrap();
        let row = Row::from_json(json).unwrap();
        assert_eq!(row.keys().collect::<Vec<_>>(), ["name", "id", "age"]);
    }

    #[test]
    fn columns_deserialize_from_both_forms() {
        let cols: Vec<Column> = serde_json::from_value(json!(["id", {"name": "n", "type": "LONG"}])).unwrap();
        assert_eq!(cols, vec![Column::new("id"), Column::typed("n", SqlType::Long)]);
    }

    #[test]
    fn column_list_parses_types() {
        let cols = Column::parse_list("id, n:long ,").unwrap();
        assert_eq!(cols, vec![Column::new("id"), Column::typed("n", SqlType::Long)]);
        assert!(Column::parse_list("x:nope").is_err());
    }

    #[test]
    fn bind_splices_literals_and_boxes_values() {
        let mut args = ArgList::new();
        assert_eq!(bind(&Arg::sql("now()"), None, &mut args), "now()");
        assert!(args.is_empty());
        assert_eq!(bind(&Arg::from(5), Some(SqlType::Long), &mut args), "?");
        assert_eq!(args.as_slice(), &[Arg::typed(SqlType::Long, 5_i64)]);
    }

    #[test]
    fn identifiers_are_checked() {
        for ok in ["users", "public.users", "\"Odd Name\"", "app.\"T\"\"x\"", "seq$1", "T#2"] {
            assert!(check_ident(ok).is_ok(), "{ok}");
        }
        for bad in ["", "a b", "users;drop", "1abc", "a.", "\"\"", "\"open", "x--"] {
            assert!(check_ident(bad).is_err(), "{bad}");
        }
    }
}
