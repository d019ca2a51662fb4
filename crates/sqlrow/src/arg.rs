//! Typed statement arguments.
//!
//! Every bind position in a canonical statement carries one [`Arg`]:
//!
//! - [`Arg::Raw`]: an untyped [`Value`]; the transport infers the SQL type
//! - [`Arg::Typed`]: a value tagged with an explicit [`SqlType`]
//! - [`Arg::Literal`]: a trusted SQL fragment spliced verbatim by the row builders
//! - [`Arg::Out`]: an output parameter for procedure calls
//!
//! The JSON wire shapes are `{"INT": 5}`, `{"ARRAY": ["int4", 1, 2]}`,
//! `{"SQL": "seq.nextval"}` and `{"OUT": "STRING", "VALUE": "x"}`. Any other
//! value is raw.
//!
//! # Trust boundary
//!
//! A literal is copied into SQL text unescaped. Only build literals from
//! fragments the application controls (sequence calls, `now()`), never from
//! user input.

use crate::error::{DbError, DbResult};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The tag set for explicitly typed arguments and result columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlType {
    Int,
    Long,
    Double,
    Float,
    Decimal,
    Boolean,
    Binary,
    String,
    Date,
    Time,
    OutCursor,
    Array,
    Json,
    Jsonb,
    Raw,
}

impl SqlType {
    pub const ALL: [SqlType; 15] = [
        SqlType::Int,
        SqlType::Long,
        SqlType::Double,
        SqlType::Float,
        SqlType::Decimal,
        SqlType::Boolean,
        SqlType::Binary,
        SqlType::String,
        SqlType::Date,
        SqlType::Time,
        SqlType::OutCursor,
        SqlType::Array,
        SqlType::Json,
        SqlType::Jsonb,
        SqlType::Raw,
    ];

    /// The wire tag, e.g. `"INT"`.
    pub fn tag(self) -> &'static str {
        match self {
            SqlType::Int => "INT",
            SqlType::Long => "LONG",
            SqlType::Double => "DOUBLE",
            SqlType::Float => "FLOAT",
            SqlType::Decimal => "DECIMAL",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Binary => "BINARY",
            SqlType::String => "STRING",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::OutCursor => "OUTCURSOR",
            SqlType::Array => "ARRAY",
            SqlType::Json => "JSON",
            SqlType::Jsonb => "JSONB",
            SqlType::Raw => "RAW",
        }
    }

    /// Coerce a value into the canonical shape for this tag.
    ///
    /// Integers floor fractional input, strings stringify, booleans use
    /// truthiness. `NULL` stays `NULL` for every tag except `BOOLEAN`.
    pub fn coerce(self, value: Value) -> DbResult<Value> {
        if value.is_null() && self != SqlType::Boolean {
            return Ok(Value::Null);
        }
        match self {
            SqlType::Int | SqlType::Long => to_integer(self, value),
            SqlType::Double | SqlType::Float => to_float(self, value),
            SqlType::Decimal => to_decimal(value),
            SqlType::Boolean => Ok(Value::Bool(value.is_truthy())),
            SqlType::String => match value {
                Value::Text(s) => Ok(Value::Text(s)),
                other => Ok(Value::Text(other.to_string())),
            },
            SqlType::Binary => match value {
                Value::Text(s) => Ok(Value::Bytes(s.into_bytes())),
                Value::Array(items) => items
                    .into_iter()
                    .map(|v| match v.as_i64().and_then(|i| u8::try_from(i).ok()) {
                        Some(b) => Ok(b),
                        None => Err(mismatch(self, &v)),
                    })
                    .collect::<DbResult<Vec<u8>>>()
                    .map(Value::Bytes),
                v @ Value::Bytes(_) => Ok(v),
                other => Err(mismatch(self, &other)),
            },
            SqlType::Date => to_date(value),
            SqlType::Time => to_time(value),
            SqlType::Json | SqlType::Jsonb => match value {
                v @ Value::Json(_) => Ok(v),
                other => Ok(Value::Json(other.to_json())),
            },
            SqlType::Array => match value {
                v @ Value::Array(_) => Ok(v),
                other => Ok(Value::Array(vec![other])),
            },
            SqlType::OutCursor | SqlType::Raw => Ok(value),
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SqlType {
    type Err = DbError;

    fn from_str(s: &str) -> DbResult<Self> {
        SqlType::ALL
            .into_iter()
            .find(|t| t.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| DbError::validation(format!("unknown SQL type tag '{s}'")))
    }
}

fn mismatch(ty: SqlType, value: &Value) -> DbError {
    DbError::validation(format!("cannot coerce {value} to {ty}"))
}

fn to_integer(ty: SqlType, value: Value) -> DbResult<Value> {
    let floored = match &value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(f.floor()),
        Value::Decimal(d) => {
            return i64::try_from(d.floor())
                .map(Value::Int)
                .map_err(|_| mismatch(ty, &value));
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => s.trim().parse::<f64>().ok().map(f64::floor),
        _ => None,
    };
    if let Value::Int(i) = value {
        return Ok(Value::Int(i));
    }
    match floored {
        Some(f) if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Ok(Value::Int(f as i64))
        }
        _ => Err(mismatch(ty, &value)),
    }
}

fn to_float(ty: SqlType, value: Value) -> DbResult<Value> {
    match &value {
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Decimal(d) => f64::try_from(*d)
            .map(Value::Float)
            .map_err(|_| mismatch(ty, &value)),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| mismatch(ty, &value)),
        _ => Err(mismatch(ty, &value)),
    }
}

fn to_decimal(value: Value) -> DbResult<Value> {
    let converted = match &value {
        Value::Decimal(d) => Some(*d),
        Value::Int(i) => Some(Decimal::from(*i)),
        Value::Float(f) => Decimal::from_f64(*f),
        Value::Text(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    };
    converted
        .map(Value::Decimal)
        .ok_or_else(|| mismatch(SqlType::Decimal, &value))
}

const DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

fn to_date(value: Value) -> DbResult<Value> {
    match value {
        v @ (Value::Date(_) | Value::Timestamp(_) | Value::TimestampTz(_)) => Ok(v),
        Value::Int(millis) => DateTime::<Utc>::from_timestamp_millis(millis)
            .map(Value::TimestampTz)
            .ok_or_else(|| mismatch(SqlType::Date, &Value::Int(millis))),
        Value::Text(s) => {
            let trimmed = s.trim();
            if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
                return Ok(Value::TimestampTz(ts.with_timezone(&Utc)));
            }
            for fmt in DATE_TIME_FORMATS {
                if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                    return Ok(Value::Timestamp(ts));
                }
            }
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| mismatch(SqlType::Date, &Value::Text(s.clone())))
        }
        other => Err(mismatch(SqlType::Date, &other)),
    }
}

fn to_time(value: Value) -> DbResult<Value> {
    match value {
        v @ Value::Time(_) => Ok(v),
        Value::Timestamp(ts) => Ok(Value::Time(ts.time())),
        Value::TimestampTz(ts) => Ok(Value::Time(ts.naive_utc().time())),
        Value::Text(s) => NaiveTime::parse_from_str(s.trim(), "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f"))
            .map(Value::Time)
            .map_err(|_| mismatch(SqlType::Time, &Value::Text(s.clone()))),
        other => Err(mismatch(SqlType::Time, &other)),
    }
}

/// A value with an explicit SQL type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedArg {
    pub ty: SqlType,
    pub value: Value,
    /// Database element type name for `ARRAY` arguments (e.g. `int4`).
    pub element_type: Option<String>,
}

impl TypedArg {
    pub fn new(ty: SqlType, value: impl Into<Value>) -> Self {
        Self {
            ty,
            value: value.into(),
            element_type: None,
        }
    }
}

/// An output parameter of a procedure call.
#[derive(Debug, Clone, PartialEq)]
pub struct OutParam {
    pub ty: SqlType,
    /// Input value for IN OUT parameters.
    pub value: Option<Box<Arg>>,
}

/// One bind argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Raw(Value),
    Typed(TypedArg),
    Literal(String),
    Out(OutParam),
}

impl Default for Arg {
    fn default() -> Self {
        Arg::Raw(Value::Null)
    }
}

impl Arg {
    pub fn null() -> Self {
        Arg::Raw(Value::Null)
    }

    /// Tag a value without coercion.
    pub fn typed(ty: SqlType, value: impl Into<Value>) -> Self {
        Arg::Typed(TypedArg::new(ty, value))
    }

    fn coerced(ty: SqlType, value: Value) -> DbResult<Self> {
        Ok(Arg::Typed(TypedArg::new(ty, ty.coerce(value)?)))
    }

    pub fn int(value: impl Into<Value>) -> DbResult<Self> {
        Self::coerced(SqlType::Int, value.into())
    }

    pub fn long(value: impl Into<Value>) -> DbResult<Self> {
        Self::coerced(SqlType::Long, value.into())
    }

    pub fn double(value: impl Into<Value>) -> DbResult<Self> {
        Self::coerced(SqlType::Double, value.into())
    }

    pub fn float(value: impl Into<Value>) -> DbResult<Self> {
        Self::coerced(SqlType::Float, value.into())
    }

    pub fn decimal(value: impl Into<Value>) -> DbResult<Self> {
        Self::coerced(SqlType::Decimal, value.into())
    }

    pub fn boolean(value: impl Into<Value>) -> Self {
        Arg::typed(SqlType::Boolean, value.into().is_truthy())
    }

    pub fn binary(value: impl Into<Value>) -> DbResult<Self> {
        Self::coerced(SqlType::Binary, value.into())
    }

    pub fn string(value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Text(s) => Arg::typed(SqlType::String, s),
            other => Arg::typed(SqlType::String, other.to_string()),
        }
    }

    pub fn date(value: impl Into<Value>) -> DbResult<Self> {
        Self::coerced(SqlType::Date, value.into())
    }

    pub fn time(value: impl Into<Value>) -> DbResult<Self> {
        Self::coerced(SqlType::Time, value.into())
    }

    pub fn json(value: impl Into<Value>) -> Self {
        Arg::typed(SqlType::Json, Value::Json(value.into().to_json()))
    }

    pub fn jsonb(value: impl Into<Value>) -> Self {
        Arg::typed(SqlType::Jsonb, Value::Json(value.into().to_json()))
    }

    /// An array with a database element type name, e.g. `Arg::array("int4", vec![1, 2, 3])`.
    pub fn array<T: Into<Value>>(element_type: impl Into<String>, values: Vec<T>) -> Self {
        Arg::Typed(TypedArg {
            ty: SqlType::Array,
            value: Value::Array(values.into_iter().map(Into::into).collect()),
            element_type: Some(element_type.into()),
        })
    }

    /// A cursor output parameter.
    pub fn out_cursor() -> Self {
        Arg::Out(OutParam {
            ty: SqlType::OutCursor,
            value: None,
        })
    }

    /// An output parameter, optionally carrying an input value (IN OUT).
    pub fn out(ty: SqlType, value: Option<Arg>) -> Self {
        Arg::Out(OutParam {
            ty,
            value: value.map(Box::new),
        })
    }

    /// A trusted SQL fragment, spliced verbatim by the row builders.
    pub fn sql(fragment: impl Into<String>) -> Self {
        Arg::Literal(fragment.into())
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Arg::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Arg::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// The carried value, ignoring any tag. Literals and pure OUT parameters have none.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Arg::Raw(v) => Some(v),
            Arg::Typed(t) => Some(&t.value),
            Arg::Out(out) => out.value.as_deref().and_then(Arg::value),
            Arg::Literal(_) => None,
        }
    }

    /// `true` for a raw or typed `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Arg::Raw(Value::Null))
            || matches!(self, Arg::Typed(t) if t.value.is_null())
    }

    /// Re-tag with a declared column type.
    ///
    /// Literals and OUT parameters are returned unchanged; the declared type
    /// replaces any tag the value already had.
    pub fn boxed(&self, ty: Option<SqlType>) -> Arg {
        match (ty, self) {
            (Some(ty), Arg::Raw(v)) => Arg::typed(ty, v.clone()),
            (Some(ty), Arg::Typed(t)) => Arg::Typed(TypedArg {
                ty,
                value: t.value.clone(),
                element_type: t.element_type.clone(),
            }),
            _ => self.clone(),
        }
    }

    /// Classify a JSON document into an argument using the wire shapes.
    pub fn from_json(json: serde_json::Value) -> DbResult<Self> {
        let serde_json::Value::Object(mut obj) = json else {
            return Ok(Arg::Raw(Value::from(json)));
        };

        let single_key = match obj.len() {
            1 => obj.keys().next().cloned(),
            _ => None,
        };
        if let Some(key) = single_key {
            if key == "SQL" {
                return match obj.remove("SQL") {
                    Some(serde_json::Value::String(s)) => Ok(Arg::Literal(s)),
                    other => Err(DbError::validation(format!(
                        "SQL marker requires a string fragment, got {}",
                        other.unwrap_or_default()
                    ))),
                };
            }
            if key.chars().all(|c| c.is_ascii_uppercase()) {
                if let Ok(ty) = key.parse::<SqlType>() {
                    let inner = obj.remove(&key).unwrap_or_default();
                    return typed_from_json(ty, inner);
                }
            }
        }

        if obj.contains_key("OUT") && obj.keys().all(|k| k == "OUT" || k == "VALUE") {
            let ty = match obj.remove("OUT") {
                Some(serde_json::Value::String(tag)) => tag.parse::<SqlType>()?,
                other => {
                    return Err(DbError::validation(format!(
                        "OUT marker requires a type tag, got {}",
                        other.unwrap_or_default()
                    )));
                }
            };
            let value = obj.remove("VALUE").map(Arg::from_json).transpose()?;
            return Ok(Arg::out(ty, value));
        }

        Ok(Arg::Raw(Value::Json(serde_json::Value::Object(obj))))
    }

    /// Render back into the JSON wire shape.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{Map, Value as J};
        match self {
            Arg::Raw(v) => v.to_json(),
            Arg::Literal(s) => J::Object(Map::from_iter([("SQL".to_string(), J::String(s.clone()))])),
            Arg::Typed(t) => {
                let inner = match (&t.element_type, &t.value) {
                    (Some(elem), Value::Array(items)) => {
                        let mut arr = vec![J::String(elem.clone())];
                        arr.extend(items.iter().map(Value::to_json));
                        J::Array(arr)
                    }
                    (_, v) => v.to_json(),
                };
                J::Object(Map::from_iter([(t.ty.tag().to_string(), inner)]))
            }
            Arg::Out(out) => {
                let mut map = Map::new();
                map.insert("OUT".to_string(), J::String(out.ty.tag().to_string()));
                if let Some(v) = &out.value {
                    map.insert("VALUE".to_string(), v.to_json());
                }
                J::Object(map)
            }
        }
    }
}

fn typed_from_json(ty: SqlType, inner: serde_json::Value) -> DbResult<Arg> {
    if ty == SqlType::Array {
        let serde_json::Value::Array(mut items) = inner else {
            return Err(DbError::validation(
                "ARRAY requires [elementType, v1, v2, ...]",
            ));
        };
        if items.is_empty() {
            return Err(DbError::validation("ARRAY requires an element type"));
        }
        let serde_json::Value::String(element_type) = items.remove(0) else {
            return Err(DbError::validation("ARRAY element type must be a string"));
        };
        return Ok(Arg::array(
            element_type,
            items.into_iter().map(Value::from).collect::<Vec<_>>(),
        ));
    }
    Arg::coerced(ty, Value::from(inner))
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for Arg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Arg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Arg::from_json(json).map_err(serde::de::Error::custom)
    }
}

macro_rules! impl_raw_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(v: $ty) -> Self {
                    Arg::Raw(Value::from(v))
                }
            }
        )*
    };
}

impl_raw_from! {
    Value,
    serde_json::Value,
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    Decimal,
    String,
    &str,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    DateTime<Utc>,
    uuid::Uuid,
}

impl<T: Into<Value>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        Arg::Raw(Value::from(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Arg {
    fn from(v: Vec<T>) -> Self {
        Arg::Raw(Value::from(v))
    }
}

/// Ordered bind arguments, aligned 1:1 with `?` placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgList {
    args: Vec<Arg>,
}

impl ArgList {
    pub fn new() -> Self {
        Self { args: Vec::new() }
    }

    /// Add an argument and return its 1-based position.
    pub fn push(&mut self, arg: impl Into<Arg>) -> usize {
        self.args.push(arg.into());
        self.args.len()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn as_slice(&self) -> &[Arg] {
        &self.args
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arg> {
        self.args.iter()
    }

    pub fn into_vec(self) -> Vec<Arg> {
        self.args
    }

    /// Append another list, keeping its order.
    pub fn extend(&mut self, other: ArgList) {
        self.args.extend(other.args);
    }
}

impl From<Vec<Arg>> for ArgList {
    fn from(args: Vec<Arg>) -> Self {
        Self { args }
    }
}

impl FromIterator<Arg> for ArgList {
    fn from_iter<I: IntoIterator<Item = Arg>>(iter: I) -> Self {
        Self {
            args: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ArgList {
    type Item = &'a Arg;
    type IntoIter = std::slice::Iter<'a, Arg>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}

impl Serialize for ArgList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.args.serialize(serializer)
    }
}

/// Build a `Vec<Arg>` from raw values or ready-made arguments.
///
/// ```ignore
/// let args = sqlrow::args![1, "Jo", Arg::int(2.7)?];
/// ```
#[macro_export]
macro_rules! args {
    () => { ::std::vec::Vec::<$crate::Arg>::new() };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn int_floors_fractional_input() {
        assert_eq!(Arg::int(2.7).unwrap(), Arg::typed(SqlType::Int, 2_i64));
        assert_eq!(Arg::long("-1.5").unwrap(), Arg::typed(SqlType::Long, -2_i64));
        assert!(Arg::int("abc").is_err());
    }

    #[test]
    fn string_and_boolean_coerce_loosely() {
        assert_eq!(Arg::string(5), Arg::typed(SqlType::String, "5"));
        assert_eq!(Arg::boolean(""), Arg::typed(SqlType::Boolean, false));
        assert_eq!(Arg::boolean(Value::Null), Arg::typed(SqlType::Boolean, false));
        assert_eq!(Arg::boolean("x"), Arg::typed(SqlType::Boolean, true));
    }

    #[test]
    fn date_accepts_common_text_forms() {
        let Arg::Typed(t) = Arg::date("2024-03-01 10:20:30").unwrap() else {
            panic!("expected typed");
        };
        assert!(matches!(t.value, Value::Timestamp(_)));

        let Arg::Typed(t) = Arg::date("2024-03-01").unwrap() else {
            panic!("expected typed");
        };
        assert!(matches!(t.value, Value::Date(_)));

        let Arg::Typed(t) = Arg::time("10:20:30").unwrap() else {
            panic!("expected typed");
        };
        assert!(matches!(t.value, Value::Time(_)));
    }

    #[test]
    fn wire_shapes_are_classified() {
        assert_eq!(
            Arg::from_json(json!({"INT": 5})).unwrap(),
            Arg::typed(SqlType::Int, 5_i64)
        );
        assert_eq!(
            Arg::from_json(json!({"SQL": "seq.nextval"})).unwrap(),
            Arg::sql("seq.nextval")
        );
        assert_eq!(
            Arg::from_json(json!({"ARRAY": ["int4", 1, 2, 3]})).unwrap(),
            Arg::array("int4", vec![1, 2, 3])
        );
        assert_eq!(
            Arg::from_json(json!({"OUT": "STRING"})).unwrap(),
            Arg::out(SqlType::String, None)
        );
        assert_eq!(Arg::from_json(json!("Jo")).unwrap(), Arg::from("Jo"));
    }

    #[test]
    fn lowercase_or_multi_key_objects_stay_raw() {
        assert_eq!(
            Arg::from_json(json!({"int": 5})).unwrap(),
            Arg::Raw(Value::Json(json!({"int": 5})))
        );
        assert_eq!(
            Arg::from_json(json!({"INT": 5, "x": 1})).unwrap(),
            Arg::Raw(Value::Json(json!({"INT": 5, "x": 1})))
        );
    }

    #[test]
    fn wire_shape_round_trips_through_serde() {
        let original = json!([{"INT": 5}, {"SQL": "now()"}, "x", {"ARRAY": ["text", "a"]}]);
        let args: Vec<Arg> = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(serde_json::to_value(&args).unwrap(), original);
    }

    #[test]
    fn boxed_uses_declared_type() {
        let raw = Arg::from(5);
        assert_eq!(raw.boxed(Some(SqlType::Long)), Arg::typed(SqlType::Long, 5_i64));
        assert_eq!(raw.boxed(None), raw);
        let literal = Arg::sql("seq.nextval");
        assert_eq!(literal.boxed(Some(SqlType::Int)), literal);
    }

    #[test]
    fn args_macro_builds_raw_arguments() {
        let args = crate::args![1, "a", Arg::sql("now()")];
        assert_eq!(args, vec![Arg::from(1), Arg::from("a"), Arg::sql("now()")]);
    }
}
