//! Statement normalization.
//!
//! Every public statement entry point accepts one of four argument shapes and
//! reduces it to canonical SQL with `?` placeholders through [`normalize`]:
//!
//! ```ignore
//! use sqlrow::{Params, normalize, named};
//!
//! let stmt = normalize("SELECT * FROM users WHERE id = :id", named! { "id" => 7 })?;
//! assert_eq!(stmt.sql, "SELECT * FROM users WHERE id = ?");
//! ```

use crate::arg::{Arg, ArgList};
use crate::error::{DbError, DbResult};
use crate::template::{Statement, scan_expressions, scan_named};
use indexmap::IndexMap;

/// Named arguments, in insertion order.
pub type NamedArgs = IndexMap<String, Arg>;

/// Resolves the text of an embedded `{expr}` into an argument.
pub trait Evaluator {
    fn eval(&self, expr: &str) -> DbResult<Arg>;
}

impl<F> Evaluator for F
where
    F: Fn(&str) -> DbResult<Arg>,
{
    fn eval(&self, expr: &str) -> DbResult<Arg> {
        self(expr)
    }
}

/// Evaluates expressions as paths into a set of named values.
///
/// `{id}` looks up `id`; `{row.id}` looks up `row` and then the `id` field of
/// its JSON value. An unknown path is an [`DbError::Eval`].
#[derive(Debug, Clone, Default)]
pub struct Scope(pub NamedArgs);

impl Scope {
    pub fn new() -> Self {
        Self(NamedArgs::new())
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }
}

impl Evaluator for Scope {
    fn eval(&self, expr: &str) -> DbResult<Arg> {
        let path = expr.trim();
        let mut segments = path.split('.').map(str::trim);
        let head = segments.next().unwrap_or_default();
        let root = self
            .0
            .get(head)
            .ok_or_else(|| DbError::eval(path, format!("'{head}' is not bound")))?;

        let mut rest = segments.peekable();
        if rest.peek().is_none() {
            return Ok(root.clone());
        }

        let mut current = root
            .value()
            .map(crate::value::Value::to_json)
            .ok_or_else(|| DbError::eval(path, format!("'{head}' has no fields")))?;
        for field in rest {
            current = match current {
                serde_json::Value::Object(mut map) => map
                    .remove(field)
                    .ok_or_else(|| DbError::eval(path, format!("no field '{field}'")))?,
                serde_json::Value::Array(mut items) => {
                    let idx: usize = field
                        .parse()
                        .map_err(|_| DbError::eval(path, format!("'{field}' is not an index")))?;
                    if idx >= items.len() {
                        return Err(DbError::eval(path, format!("index {idx} out of range")));
                    }
                    items.swap_remove(idx)
                }
                _ => return Err(DbError::eval(path, format!("cannot read '{field}'"))),
            };
        }
        Arg::from_json(current)
    }
}

/// The four argument shapes a statement can carry.
#[derive(Clone, Copy, Default)]
pub enum Params<'a> {
    /// SQL is passed through unchanged.
    #[default]
    None,
    /// Already aligned with the `?` placeholders.
    Positional(&'a [Arg]),
    /// `:name` placeholders.
    Named(&'a NamedArgs),
    /// `{expr}` placeholders.
    Eval(&'a (dyn Evaluator + Sync)),
}

impl std::fmt::Debug for Params<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Params::None => f.write_str("None"),
            Params::Positional(args) => f.debug_tuple("Positional").field(args).finish(),
            Params::Named(args) => f.debug_tuple("Named").field(args).finish(),
            Params::Eval(_) => f.write_str("Eval(..)"),
        }
    }
}

impl<'a> From<&'a [Arg]> for Params<'a> {
    fn from(args: &'a [Arg]) -> Self {
        Params::Positional(args)
    }
}

impl<'a> From<&'a Vec<Arg>> for Params<'a> {
    fn from(args: &'a Vec<Arg>) -> Self {
        Params::Positional(args.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [Arg; N]> for Params<'a> {
    fn from(args: &'a [Arg; N]) -> Self {
        Params::Positional(args.as_slice())
    }
}

impl<'a> From<&'a ArgList> for Params<'a> {
    fn from(args: &'a ArgList) -> Self {
        Params::Positional(args.as_slice())
    }
}

impl<'a> From<&'a NamedArgs> for Params<'a> {
    fn from(args: &'a NamedArgs) -> Self {
        Params::Named(args)
    }
}

impl<'a> From<&'a Scope> for Params<'a> {
    fn from(scope: &'a Scope) -> Self {
        Params::Eval(scope)
    }
}

/// Arguments classified from an untyped JSON document.
///
/// Arrays are positional, objects are named and `null` means no arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedParams {
    None,
    Positional(Vec<Arg>),
    Named(NamedArgs),
}

impl OwnedParams {
    pub fn as_params(&self) -> Params<'_> {
        match self {
            OwnedParams::None => Params::None,
            OwnedParams::Positional(args) => Params::Positional(args),
            OwnedParams::Named(args) => Params::Named(args),
        }
    }
}

impl Params<'_> {
    /// Classify a JSON document.
    ///
    /// # Errors
    ///
    /// [`DbError::UnsupportedArgumentShape`] for a scalar top level.
    pub fn from_json(json: serde_json::Value) -> DbResult<OwnedParams> {
        match json {
            serde_json::Value::Null => Ok(OwnedParams::None),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Arg::from_json)
                .collect::<DbResult<Vec<_>>>()
                .map(OwnedParams::Positional),
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| Arg::from_json(v).map(|arg| (k, arg)))
                .collect::<DbResult<NamedArgs>>()
                .map(OwnedParams::Named),
            other => Err(DbError::UnsupportedArgumentShape(format!(
                "expected an array, an object or null, got {other}"
            ))),
        }
    }
}

/// Reduce a template and its arguments to canonical SQL.
pub fn normalize<'a>(sql: &str, params: impl Into<Params<'a>>) -> DbResult<Statement> {
    match params.into() {
        Params::None => Ok(Statement::raw(sql)),
        Params::Positional(args) => Ok(Statement::new(sql, args.to_vec())),
        Params::Named(args) => Ok(scan_named(sql, args)),
        Params::Eval(evaluator) => scan_expressions(sql, |expr| evaluator.eval(expr)),
    }
}

/// Build [`NamedArgs`] from `name => value` pairs.
///
/// ```ignore
/// let args = sqlrow::named! { "id" => 7, "name" => "Jo" };
/// ```
#[macro_export]
macro_rules! named {
    () => { $crate::NamedArgs::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::NamedArgs::new();
        $( map.insert(::std::string::String::from($name), $crate::Arg::from($value)); )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn none_leaves_sql_unchanged() {
        let stmt = normalize("SELECT {x} :y", Params::None).unwrap();
        assert_eq!(stmt, Statement::raw("SELECT {x} :y"));
    }

    #[test]
    fn positional_is_passed_through() {
        let args = crate::args![1, "a"];
        let stmt = normalize("SELECT ?, ?", &args).unwrap();
        assert_eq!(stmt.sql, "SELECT ?, ?");
        assert_eq!(stmt.args(), args.as_slice());
    }

    #[test]
    fn named_and_eval_route_to_scanners() {
        let args = crate::named! { "id" => 3 };
        let stmt = normalize("WHERE id = :id", &args).unwrap();
        assert_eq!(stmt.sql, "WHERE id = ?");

        let scope = Scope::new().with("id", 3);
        let stmt = normalize("WHERE id = {id}", &scope).unwrap();
        assert_eq!(stmt.sql, "WHERE id = ?");
        assert_eq!(stmt.args(), &[Arg::from(3)]);
    }

    #[test]
    fn closures_evaluate_expressions() {
        let eval = |expr: &str| -> DbResult<Arg> { Ok(Arg::from(expr.len() as i64)) };
        let stmt = normalize("SELECT {abc}", Params::Eval(&eval)).unwrap();
        assert_eq!(stmt.args(), &[Arg::from(3_i64)]);
    }

    #[test]
    fn scope_reads_nested_fields() {
        let scope = Scope::new().with("row", json!({"id": 9, "tags": ["a", {"INT": 2.5}]}));
        assert_eq!(scope.eval("row.id").unwrap(), Arg::from(9));
        assert_eq!(scope.eval(" row . tags . 0 ").unwrap(), Arg::from("a"));
        assert_eq!(scope.eval("row.tags.1").unwrap(), Arg::int(2).unwrap());
        assert!(matches!(scope.eval("row.nope"), Err(DbError::Eval { .. })));
        assert!(matches!(scope.eval("other"), Err(DbError::Eval { .. })));
    }

    #[test]
    fn json_params_are_classified() {
        assert_eq!(Params::from_json(json!(null)).unwrap(), OwnedParams::None);
        assert_eq!(
            Params::from_json(json!([1, {"STRING": 2}])).unwrap(),
            OwnedParams::Positional(vec![Arg::from(1), Arg::string(2)])
        );
        let OwnedParams::Named(map) = Params::from_json(json!({"id": {"LONG": 4}})).unwrap() else {
            panic!("expected named");
        };
        assert_eq!(map["id"], Arg::long(4).unwrap());
    }

    #[test]
    fn scalar_json_is_an_unsupported_shape() {
        let err = Params::from_json(json!(42)).unwrap_err();
        assert!(matches!(err, DbError::UnsupportedArgumentShape(_)));
    }
}
