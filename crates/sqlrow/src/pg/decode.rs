use crate::arg::SqlType;
use crate::error::{DbError, DbResult};
use crate::transport::{ColumnMeta, Record};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::error::Error;
use tokio_postgres::types::{FromSql, Kind, Type};
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

impl<'a> FromSql<'a> for Value {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        match ty.kind() {
            Kind::Array(_) => return Vec::<Value>::from_sql(ty, raw).map(Value::Array),
            Kind::Domain(inner) => return Value::from_sql(inner, raw),
            _ => {}
        }

        Ok(match *ty {
            Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            Type::INT2 => Value::Int(i16::from_sql(ty, raw)?.into()),
            Type::INT4 => Value::Int(i32::from_sql(ty, raw)?.into()),
            Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
            Type::OID => Value::Int(u32::from_sql(ty, raw)?.into()),
            Type::FLOAT4 => Value::Float(f32::from_sql(ty, raw)?.into()),
            Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
            Type::NUMERIC => Value::Decimal(Decimal::from_sql(ty, raw)?),
            Type::BYTEA => Value::Bytes(Vec::<u8>::from_sql(ty, raw)?),
            Type::DATE => Value::Date(NaiveDate::from_sql(ty, raw)?),
            Type::TIME => Value::Time(NaiveTime::from_sql(ty, raw)?),
            Type::TIMESTAMP => Value::Timestamp(NaiveDateTime::from_sql(ty, raw)?),
            Type::TIMESTAMPTZ => Value::TimestampTz(DateTime::<Utc>::from_sql(ty, raw)?),
            Type::UUID => Value::Uuid(Uuid::from_sql(ty, raw)?),
            Type::JSON | Type::JSONB => Value::Json(serde_json::Value::from_sql(ty, raw)?),
            // text, enums, refcursor names and other text-encoded types
            _ => match std::str::from_utf8(raw) {
                Ok(s) => Value::Text(s.to_string()),
                Err(_) => Value::Bytes(raw.to_vec()),
            },
        })
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, BoxError> {
        Ok(Value::Null)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// Type tag for a PostgreSQL column type.
pub(crate) fn sql_type_of(ty: &Type) -> SqlType {
    match ty.kind() {
        Kind::Array(_) => return SqlType::Array,
        Kind::Domain(inner) => return sql_type_of(inner),
        Kind::Enum(_) => return SqlType::String,
        _ => {}
    }
    match *ty {
        Type::INT2 | Type::INT4 => SqlType::Int,
        Type::INT8 | Type::OID => SqlType::Long,
        Type::FLOAT4 => SqlType::Float,
        Type::FLOAT8 => SqlType::Double,
        Type::NUMERIC => SqlType::Decimal,
        Type::BOOL => SqlType::Boolean,
        Type::BYTEA => SqlType::Binary,
        Type::DATE | Type::TIMESTAMP | Type::TIMESTAMPTZ => SqlType::Date,
        Type::TIME | Type::TIMETZ => SqlType::Time,
        Type::JSON => SqlType::Json,
        Type::JSONB => SqlType::Jsonb,
        Type::REFCURSOR => SqlType::OutCursor,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN | Type::UUID => {
            SqlType::String
        }
        _ => SqlType::Raw,
    }
}

pub(crate) fn column_meta(columns: &[tokio_postgres::Column]) -> Vec<ColumnMeta> {
    columns
        .iter()
        .map(|col| ColumnMeta {
            name: col.name().to_string(),
            ty: sql_type_of(col.type_()),
            db_type: col.type_().name().to_string(),
        })
        .collect()
}

/// Decode one row into a record keyed by column name.
pub(crate) fn decode_row(row: &tokio_postgres::Row) -> DbResult<Record> {
    let mut record = Record::with_capacity(row.len());
    for (idx, col) in row.columns().iter().enumerate() {
        let value: Value = row
            .try_get(idx)
            .map_err(|e| DbError::decode(col.name(), e.to_string()))?;
        record.insert(col.name().to_string(), value);
    }
    Ok(record)
}
