//! Column-typed value handling for stores that do not have a SQL engine doing it for them.

use crate::error::AppError;
use crate::table::{Column, ColumnType};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::cmp::Ordering;
use std::str::FromStr;

fn invalid(column: &Column, v: &Value) -> AppError {
    AppError::Validation(format!(
        "invalid value for {} ({}): {}",
        column.name,
        column.column_type.cast(),
        v
    ))
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_decimal(v: &Value) -> Option<Decimal> {
    scalar_text(v).and_then(|s| Decimal::from_str(s.trim()).ok())
}

fn parse_int(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    v.as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

/// Normalize `v` to the stored representation of `column`, rejecting what the column type would.
/// Numerics are rounded to their scale and kept as text, like `NUMERIC::text`.
pub fn coerce(column: &Column, v: &Value) -> Result<Value, AppError> {
    if v.is_null() {
        return Ok(Value::Null);
    }
    match column.column_type {
        ColumnType::BigInt => parse_int(v).map(Value::from).ok_or_else(|| invalid(column, v)),
        ColumnType::Integer => parse_int(v)
            .and_then(|n| i32::try_from(n).ok())
            .map(Value::from)
            .ok_or_else(|| invalid(column, v)),
        ColumnType::Numeric { precision, scale } => {
            let mut d = parse_decimal(v)
                .ok_or_else(|| invalid(column, v))?
                .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
            let limit = Decimal::from_i128_with_scale(10i128.pow(precision - scale), 0);
            if d.abs() >= limit {
                return Err(AppError::Validation(format!("numeric field overflow for {}", column.name)));
            }
            d.rescale(scale);
            Ok(Value::String(d.to_string()))
        }
        ColumnType::Varchar(max) => {
            let s = scalar_text(v).ok_or_else(|| invalid(column, v))?;
            if s.chars().count() > max as usize {
                return Err(AppError::Validation(format!(
                    "value too long for {} (max {} characters)",
                    column.name, max
                )));
            }
            Ok(Value::String(s))
        }
        ColumnType::Text => scalar_text(v).map(Value::String).ok_or_else(|| invalid(column, v)),
        ColumnType::Timestamp => parse_timestamp(v)
            .map(|d| Value::String(d.to_rfc3339()))
            .ok_or_else(|| invalid(column, v)),
    }
}

/// Compare two values of `column` by its SQL type. `None` when either side is NULL or unparsable.
pub fn compare(column: &Column, a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_null() || b.is_null() {
        return None;
    }
    match column.column_type {
        ColumnType::BigInt | ColumnType::Integer => Some(parse_int(a)?.cmp(&parse_int(b)?)),
        ColumnType::Numeric { .. } => Some(parse_decimal(a)?.cmp(&parse_decimal(b)?)),
        ColumnType::Varchar(_) | ColumnType::Text => Some(scalar_text(a)?.cmp(&scalar_text(b)?)),
        ColumnType::Timestamp => Some(parse_timestamp(a)?.cmp(&parse_timestamp(b)?)),
    }
}
