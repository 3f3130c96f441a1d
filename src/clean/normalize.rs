use super::stats;
use super::{Cleaned, Diagnostic};
use crate::data::model::{ColumnKind, Table, Value};
use crate::error::CleanError;

/// Min-max scale numeric columns to `(v - min) / (max - min)`.
///
/// With `columns = None` every numeric column is scaled.  An explicitly
/// named column must exist; a named non-numeric column is skipped with a
/// [`Diagnostic::NotNumeric`].
///
/// A column whose min equals its max divides zero by zero and comes out
/// as all NaN.  Missing values stay missing; scaled columns become
/// [`ColumnKind::Numeric`].
pub fn normalize_data(mut table: Table, columns: Option<&[String]>) -> Result<Cleaned, CleanError> {
    let targets: Vec<String> = match columns {
        None => table
            .columns
            .iter()
            .filter(|c| c.kind.is_numeric())
            .map(|c| c.name.clone())
            .collect(),
        Some(names) => {
            if let Some(absent) = names.iter().find(|n| table.column(n).is_none()) {
                return Err(CleanError::ColumnNotFound {
                    column: absent.clone(),
                });
            }
            names.to_vec()
        }
    };

    let mut diagnostics = Vec::new();

    for name in targets {
        let Some(column) = table.column_mut(&name) else {
            continue;
        };
        if !column.kind.is_numeric() {
            diagnostics.push(Diagnostic::NotNumeric { column: name });
            continue;
        }

        let Some((min, max)) = stats::min_max(&column.numeric_values()) else {
            column.kind = ColumnKind::Numeric;
            continue;
        };
        let range = max - min;
        if range == 0.0 {
            log::debug!("'{name}': min equals max ({min}), scaled values are NaN");
        }

        for v in &mut column.values {
            *v = match v.as_f64() {
                Some(x) => Value::Float((x - min) / range),
                None => Value::Null,
            };
        }
        column.kind = ColumnKind::Numeric;
    }

    Ok(Cleaned { table, diagnostics })
}
