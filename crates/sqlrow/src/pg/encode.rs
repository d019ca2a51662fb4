use crate::arg::{Arg, SqlType};
use crate::value::Value;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::error::Error;
use tokio_postgres::types::{IsNull, Kind, ToSql, Type};
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

/// Parameter type to declare when preparing a statement.
///
/// `UNKNOWN` leaves inference to the server, which is what untyped text and
/// `NULL` want: the encoder then adapts the value to the inferred type.
pub(crate) fn param_type(arg: &Arg) -> Type {
    match arg {
        Arg::Raw(value) => raw_param_type(value),
        Arg::Typed(typed) => match typed.ty {
            SqlType::Int => Type::INT4,
            SqlType::Long => Type::INT8,
            SqlType::Double => Type::FLOAT8,
            SqlType::Float => Type::FLOAT4,
            SqlType::Decimal => Type::NUMERIC,
            SqlType::Boolean => Type::BOOL,
            SqlType::Binary => Type::BYTEA,
            SqlType::String => Type::TEXT,
            SqlType::Date => match SqlType::Date.coerce(typed.value.clone()) {
                Ok(Value::Date(_)) => Type::DATE,
                Ok(Value::Timestamp(_)) => Type::TIMESTAMP,
                Ok(Value::TimestampTz(_)) => Type::TIMESTAMPTZ,
                _ => Type::UNKNOWN,
            },
            SqlType::Time => Type::TIME,
            SqlType::OutCursor => Type::REFCURSOR,
            SqlType::Array => typed
                .element_type
                .as_deref()
                .and_then(array_type)
                .unwrap_or(Type::UNKNOWN),
            SqlType::Json => Type::JSON,
            SqlType::Jsonb => Type::JSONB,
            SqlType::Raw => raw_param_type(&typed.value),
        },
        Arg::Out(out) => match out.value.as_deref() {
            Some(inner) => param_type(inner),
            None => param_type(&Arg::typed(out.ty, Value::Null)),
        },
        Arg::Literal(_) => Type::UNKNOWN,
    }
}

fn raw_param_type(value: &Value) -> Type {
    match value {
        Value::Bool(_) => Type::BOOL,
        Value::Int(_) => Type::INT8,
        Value::Float(_) => Type::FLOAT8,
        Value::Decimal(_) => Type::NUMERIC,
        Value::Bytes(_) => Type::BYTEA,
        Value::Date(_) => Type::DATE,
        Value::Time(_) => Type::TIME,
        Value::Timestamp(_) => Type::TIMESTAMP,
        Value::TimestampTz(_) => Type::TIMESTAMPTZ,
        Value::Uuid(_) => Type::UUID,
        Value::Json(_) => Type::JSONB,
        Value::Null | Value::Text(_) | Value::Array(_) => Type::UNKNOWN,
    }
}

/// Array type for a database element type name.
pub(crate) fn array_type(element: &str) -> Option<Type> {
    let element = element.trim().to_ascii_lowercase();
    Some(match element.as_str() {
        "int2" | "smallint" => Type::INT2_ARRAY,
        "int4" | "int" | "integer" => Type::INT4_ARRAY,
        "int8" | "bigint" => Type::INT8_ARRAY,
        "float4" | "real" => Type::FLOAT4_ARRAY,
        "float8" | "double precision" => Type::FLOAT8_ARRAY,
        "numeric" | "decimal" => Type::NUMERIC_ARRAY,
        "bool" | "boolean" => Type::BOOL_ARRAY,
        "text" => Type::TEXT_ARRAY,
        "varchar" | "character varying" => Type::VARCHAR_ARRAY,
        "date" => Type::DATE_ARRAY,
        "time" => Type::TIME_ARRAY,
        "timestamp" => Type::TIMESTAMP_ARRAY,
        "timestamptz" => Type::TIMESTAMPTZ_ARRAY,
        "uuid" => Type::UUID_ARRAY,
        "json" => Type::JSON_ARRAY,
        "jsonb" => Type::JSONB_ARRAY,
        "bytea" => Type::BYTEA_ARRAY,
        _ => return None,
    })
}

impl ToSql for Arg {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Arg::Raw(value) => value.to_sql(ty, out),
            Arg::Typed(typed) => typed.ty.coerce(typed.value.clone())?.to_sql(ty, out),
            Arg::Out(param) => match param.value.as_deref() {
                Some(inner) => inner.to_sql(ty, out),
                None => Ok(IsNull::Yes),
            },
            Arg::Literal(fragment) => {
                Err(format!("literal SQL `{fragment}` cannot be bound as a parameter").into())
            }
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        if self.is_null() {
            return Ok(IsNull::Yes);
        }
        match ty.kind() {
            Kind::Array(_) => {
                return match self {
                    Value::Array(items) => items.to_sql(ty, out),
                    Value::Json(serde_json::Value::Array(items)) => items
                        .iter()
                        .cloned()
                        .map(Value::from)
                        .collect::<Vec<_>>()
                        .to_sql(ty, out),
                    other => vec![other.clone()].to_sql(ty, out),
                };
            }
            Kind::Domain(inner) => return self.to_sql(inner, out),
            Kind::Enum(_) => return text(self).as_str().to_sql(&Type::TEXT, out),
            _ => {}
        }

        match *ty {
            Type::BOOL => self.is_truthy().to_sql(ty, out),
            Type::INT2 => i16::try_from(integer(self)?)?.to_sql(ty, out),
            Type::INT4 => i32::try_from(integer(self)?)?.to_sql(ty, out),
            Type::INT8 => integer(self)?.to_sql(ty, out),
            Type::OID => u32::try_from(integer(self)?)?.to_sql(ty, out),
            Type::FLOAT4 => (float(self)? as f32).to_sql(ty, out),
            Type::FLOAT8 => float(self)?.to_sql(ty, out),
            Type::NUMERIC => decimal(self)?.to_sql(ty, out),
            Type::BYTEA => match SqlType::Binary.coerce(self.clone())? {
                Value::Bytes(b) => b.to_sql(ty, out),
                other => Err(mismatch(&other, ty)),
            },
            Type::DATE => match SqlType::Date.coerce(self.clone())? {
                Value::Date(d) => d.to_sql(ty, out),
                Value::Timestamp(ts) => ts.date().to_sql(ty, out),
                Value::TimestampTz(ts) => ts.date_naive().to_sql(ty, out),
                other => Err(mismatch(&other, ty)),
            },
            Type::TIMESTAMP => timestamp(self)?.to_sql(ty, out),
            Type::TIMESTAMPTZ => timestamptz(self)?.to_sql(ty, out),
            Type::TIME => match SqlType::Time.coerce(self.clone())? {
                Value::Time(t) => t.to_sql(ty, out),
                other => Err(mismatch(&other, ty)),
            },
            Type::UUID => uuid(self)?.to_sql(ty, out),
            Type::JSON | Type::JSONB => self.to_json().to_sql(ty, out),
            // text-like and anything the server left unresolved
            _ => text(self).as_str().to_sql(&Type::TEXT, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

fn mismatch(value: &Value, ty: &Type) -> BoxError {
    format!("cannot encode {value} as {ty}").into()
}

fn integer(value: &Value) -> Result<i64, BoxError> {
    match SqlType::Long.coerce(value.clone())? {
        Value::Int(i) => Ok(i),
        other => Err(mismatch(&other, &Type::INT8)),
    }
}

fn float(value: &Value) -> Result<f64, BoxError> {
    match SqlType::Double.coerce(value.clone())? {
        Value::Float(f) => Ok(f),
        other => Err(mismatch(&other, &Type::FLOAT8)),
    }
}

fn decimal(value: &Value) -> Result<Decimal, BoxError> {
    match SqlType::Decimal.coerce(value.clone())? {
        Value::Decimal(d) => Ok(d),
        other => Err(mismatch(&other, &Type::NUMERIC)),
    }
}

fn timestamp(value: &Value) -> Result<NaiveDateTime, BoxError> {
    match SqlType::Date.coerce(value.clone())? {
        Value::Timestamp(ts) => Ok(ts),
        Value::TimestampTz(ts) => Ok(ts.naive_utc()),
        Value::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
        other => Err(mismatch(&other, &Type::TIMESTAMP)),
    }
}

fn timestamptz(value: &Value) -> Result<DateTime<Utc>, BoxError> {
    match SqlType::Date.coerce(value.clone())? {
        Value::TimestampTz(ts) => Ok(ts),
        Value::Timestamp(ts) => Ok(ts.and_utc()),
        Value::Date(d) => Ok(d.and_time(NaiveTime::MIN).and_utc()),
        other => Err(mismatch(&other, &Type::TIMESTAMPTZ)),
    }
}

fn uuid(value: &Value) -> Result<Uuid, BoxError> {
    match value {
        Value::Uuid(u) => Ok(*u),
        Value::Text(s) => Ok(Uuid::parse_str(s.trim())?),
        other => Err(mismatch(other, &Type::UUID)),
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Json(json) => json.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(arg: &Arg, ty: &Type) -> Option<Vec<u8>> {
        let mut buf = BytesMut::new();
        match arg.to_sql(ty, &mut buf).unwrap() {
            IsNull::Yes => None,
            IsNull::No => Some(buf.to_vec()),
        }
    }

    #[test]
    fn integers_adapt_to_server_type() {
        assert_eq!(encode(&Arg::from(7), &Type::INT4), Some(7_i32.to_be_bytes().to_vec()));
        assert_eq!(encode(&Arg::from("7"), &Type::INT8), Some(7_i64.to_be_bytes().to_vec()));
        assert_eq!(encode(&Arg::from(2.9), &Type::INT2), Some(2_i16.to_be_bytes().to_vec()));
    }

    #[test]
    fn text_targets_receive_display_form() {
        assert_eq!(encode(&Arg::from(7), &Type::TEXT), Some(b"7".to_vec()));
        assert_eq!(encode(&Arg::from("abc"), &Type::VARCHAR), Some(b"abc".to_vec()));
    }

    #[test]
    fn nulls_and_empty_out_params_are_null() {
        assert_eq!(encode(&Arg::null(), &Type::INT4), None);
        assert_eq!(encode(&Arg::out(SqlType::String, None), &Type::TEXT), None);
        assert_eq!(encode(&Arg::typed(SqlType::Int, Value::Null), &Type::INT4), None);
    }

    #[test]
    fn literals_cannot_be_bound() {
        let mut buf = BytesMut::new();
        assert!(Arg::sql("now()").to_sql(&Type::TEXT, &mut buf).is_err());
    }

    #[test]
    fn out_of_range_integers_fail() {
        let mut buf = BytesMut::new();
        assert!(Arg::from(70_000).to_sql(&Type::INT2, &mut buf).is_err());
    }

    #[test]
    fn param_types_follow_tags_and_shapes() {
        assert_eq!(param_type(&Arg::int(1).unwrap()), Type::INT4);
        assert_eq!(param_type(&Arg::from(1)), Type::INT8);
        assert_eq!(param_type(&Arg::from("x")), Type::UNKNOWN);
        assert_eq!(param_type(&Arg::from(serde_json::json!({"a": 1}))), Type::JSONB);
        assert_eq!(param_type(&Arg::json(serde_json::json!({"a": 1}))), Type::JSON);
        assert_eq!(param_type(&Arg::array("int4", vec![1, 2])), Type::INT4_ARRAY);
        assert_eq!(param_type(&Arg::out_cursor()), Type::REFCURSOR);
        assert_eq!(param_type(&Arg::date("2024-01-02").unwrap()), Type::DATE);
    }
}
