use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::{Cleaned, Diagnostic};
use crate::data::model::{Column, ColumnKind, Table, Value, format_float};
use crate::error::CleanError;

// ---------------------------------------------------------------------------
// TargetType
// ---------------------------------------------------------------------------

/// The type a column can be coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Numeric,
    Integer,
    Text,
    Categorical,
}

impl FromStr for TargetType {
    type Err = CleanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numeric" | "float" | "float64" | "double" => Ok(TargetType::Numeric),
            "integer" | "int" | "int64" => Ok(TargetType::Integer),
            "text" | "str" | "string" | "object" => Ok(TargetType::Text),
            "categorical" | "category" => Ok(TargetType::Categorical),
            _ => Err(CleanError::InvalidType(s.to_string())),
        }
    }
}

/// Accepts every spelling [`FromStr`] does, in any case.
impl<'de> Deserialize<'de> for TargetType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        String::deserialize(deserializer)?
            .parse()
            .map_err(D::Error::custom)
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetType::Numeric => "numeric",
            TargetType::Integer => "integer",
            TargetType::Text => "text",
            TargetType::Categorical => "categorical",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Coerce the columns named in `mapping`, in mapping order.
///
/// A failed coercion leaves the column exactly as it was and records a
/// [`Diagnostic::CoercionFailed`]; a name the table lacks records a
/// [`Diagnostic::ColumnNotFound`].
pub fn transform_data_types(mut table: Table, mapping: &[(String, TargetType)]) -> Cleaned {
    let mut diagnostics = Vec::new();

    for &(ref name, target) in mapping {
        let Some(column) = table.column_mut(name) else {
            diagnostics.push(Diagnostic::ColumnNotFound {
                column: name.clone(),
            });
            continue;
        };

        match coerce_column(column, target) {
            Ok(coerced) => {
                log::debug!("'{name}': {} → {target}", column.kind);
                *column = coerced;
            }
            Err(reason) => diagnostics.push(Diagnostic::CoercionFailed {
                column: name.clone(),
                target,
                reason,
            }),
        }
    }

    Cleaned { table, diagnostics }
}

/// Build the coerced copy of `column`, or explain the first value that
/// does not convert.
fn coerce_column(column: &Column, target: TargetType) -> Result<Column, String> {
    let (kind, values) = match target {
        TargetType::Numeric => (ColumnKind::Numeric, convert(&column.values, to_numeric)?),
        TargetType::Integer => (ColumnKind::Integer, convert(&column.values, to_integer)?),
        TargetType::Text => (ColumnKind::Text, convert(&column.values, to_text)?),
        TargetType::Categorical => (ColumnKind::Categorical, column.values.clone()),
    };
    Ok(Column::new(column.name.clone(), kind, values))
}

fn convert(values: &[Value], f: fn(&Value) -> Result<Value, String>) -> Result<Vec<Value>, String> {
    values
        .iter()
        .enumerate()
        .map(|(row, v)| f(v).map_err(|e| format!("row {row}: {e}")))
        .collect()
}

fn to_numeric(value: &Value) -> Result<Value, String> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Integer(i) => Ok(Value::Float(*i as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| format!("'{s}' is not a number")),
    }
}

/// 2^63: the first float past `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Floats truncate toward zero; missing values cannot be represented.
fn to_integer(value: &Value) -> Result<Value, String> {
    match value {
        v if v.is_missing() => Err("missing values cannot be stored as integers".to_string()),
        Value::Integer(i) => Ok(Value::Integer(*i)),
        Value::Float(f) => {
            let t = f.trunc();
            if t.is_finite() && (-I64_BOUND..I64_BOUND).contains(&t) {
                Ok(Value::Integer(t as i64))
            } else {
                Err(format!("{f} does not fit in a 64-bit integer"))
            }
        }
        Value::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| format!("'{s}' is not an integer")),
        Value::Null => Err("missing values cannot be stored as integers".to_string()),
    }
}

fn to_text(value: &Value) -> Result<Value, String> {
    Ok(match value {
        v if v.is_missing() => Value::Null,
        Value::Float(f) => Value::Text(format_float(*f)),
        Value::Integer(i) => Value::Text(i.to_string()),
        Value::Text(s) => Value::Text(s.clone()),
        Value::Null => Value::Null,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
