use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::stats;
use super::{Cleaned, Diagnostic};
use crate::data::model::{Table, Value};
use crate::error::CleanError;

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How missing values in a column are dealt with.  Spellings are
/// case-insensitive wherever they are read (CLI or TOML).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputeStrategy {
    Mean,
    Median,
    Mode,
    /// Remove every row missing a value in the column.
    Drop,
}

impl FromStr for ImputeStrategy {
    type Err = CleanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(ImputeStrategy::Mean),
            "median" => Ok(ImputeStrategy::Median),
            "mode" => Ok(ImputeStrategy::Mode),
            "drop" => Ok(ImputeStrategy::Drop),
            _ => Err(CleanError::InvalidStrategy(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ImputeStrategy {
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

impl fmt::Display for ImputeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImputeStrategy::Mean => "mean",
            ImputeStrategy::Median => "median",
            ImputeStrategy::Mode => "mode",
            ImputeStrategy::Drop => "drop",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Fill or drop missing values column by column.
///
/// Numeric columns (in table order) are handled first with
/// `numeric_strategy`, then the remaining columns with
/// `non_numeric_strategy`.  `columns` narrows the selection; names the table
/// does not have are ignored.
///
/// Columns are processed one after another against the current table, so a
/// `Drop` on one column shrinks the rows every later column sees, including
/// the values its mean / median / mode is computed from.
pub fn handle_missing_values(
    mut table: Table,
    numeric_strategy: ImputeStrategy,
    non_numeric_strategy: ImputeStrategy,
    columns: Option<&[String]>,
) -> Cleaned {
    let selected = |name: &str| columns.map_or(true, |cols| cols.iter().any(|c| c == name));

    let (numeric, other): (Vec<_>, Vec<_>) = table
        .columns
        .iter()
        .filter(|c| selected(&c.name))
        .map(|c| (c.name.clone(), c.kind.is_numeric()))
        .partition(|(_, is_numeric)| *is_numeric);

    let mut diagnostics = Vec::new();

    for (name, _) in numeric {
        fill_column(&mut table, &name, numeric_strategy, &mut diagnostics);
    }

    for (name, _) in other {
        match non_numeric_strategy {
            ImputeStrategy::Mode | ImputeStrategy::Drop => {
                fill_column(&mut table, &name, non_numeric_strategy, &mut diagnostics);
            }
            strategy => diagnostics.push(Diagnostic::UnsupportedStrategy {
                column: name,
                strategy,
            }),
        }
    }

    Cleaned { table, diagnostics }
}

/// Apply `strategy` to the named column of the current table.
fn fill_column(
    table: &mut Table,
    name: &str,
    strategy: ImputeStrategy,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(column) = table.column(name) else {
        return;
    };
    let missing = column.missing_count();
    if missing == 0 {
        return;
    }

    if strategy == ImputeStrategy::Drop {
        let keep: Vec<bool> = column.values.iter().map(|v| !v.is_missing()).collect();
        table.retain_rows(&keep);
        log::debug!("'{name}': dropped {missing} rows with missing values");
        return;
    }

    let fill = match strategy {
        ImputeStrategy::Mean => stats::mean(&column.numeric_values()).map(Value::Float),
        ImputeStrategy::Median => stats::median(&column.numeric_values()).map(Value::Float),
        ImputeStrategy::Mode => stats::mode(&column.values),
        ImputeStrategy::Drop => unreachable!("drop handled above"),
    };

    let Some(fill) = fill else {
        diagnostics.push(Diagnostic::NoFillValue {
            column: name.to_string(),
            strategy,
        });
        return;
    };

    log::debug!("'{name}': filling {missing} missing values with {strategy} = {fill}");
    if let Some(column) = table.column_mut(name) {
        for v in column.values.iter_mut().filter(|v| v.is_missing()) {
            *v = fill.clone();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnKind};
    use approx::assert_relative_eq;

    fn num(values: &[Option<f64>]) -> Vec<Value> {
        values
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Float))
            .collect()
    }

    fn text(values: &[Option<&str>]) -> Vec<Value> {
        values
            .iter()
            .map(|v| v.map_or(Value::Null, |s| Value::Text(s.to_string())))
            .collect()
    }

    fn table(columns: Vec<Column>) -> Table {
        Table::new(columns).unwrap()
    }

    #[test]
    fn parses_strategies_case_insensitively() {
        assert_eq!("Median".parse::<ImputeStrategy>(), Ok(ImputeStrategy::Median));
        assert_eq!(
            "zero".parse::<ImputeStrategy>(),
            Err(CleanError::InvalidStrategy("zero".into()))
        );
    }

    #[test]
    fn mean_fills_numeric_and_mode_fills_text() {
        let t = table(vec![
            Column::new("x", ColumnKind::Numeric, num(&[Some(1.0), None, Some(5.0)])),
            Column::new("c", ColumnKind::Text, text(&[Some("a"), Some("a"), None])),
        ]);
        let out = handle_missing_values(t, ImputeStrategy::Mean, ImputeStrategy::Mode, None);

        assert!(out.diagnostics.is_empty());
        assert_relative_eq!(out.table.column("x").unwrap().values[1].as_f64().unwrap(), 3.0);
        assert_eq!(out.table.column("c").unwrap().values[2], Value::Text("a".into()));
    }

    #[test]
    fn median_and_mode_on_numeric() {
        let values = num(&[Some(1.0), Some(2.0), Some(2.0), Some(10.0), None]);
        let t = table(vec![Column::new("x", ColumnKind::Numeric, values.clone())]);
        let out = handle_missing_values(t, ImputeStrategy::Median, ImputeStrategy::Mode, None);
        assert_eq!(out.table.column("x").unwrap().values[4], Value::Float(2.0));

        let t = table(vec![Column::new("x", ColumnKind::Numeric, values)]);
        let out = handle_missing_values(t, ImputeStrategy::Mode, ImputeStrategy::Mode, None);
        assert_eq!(out.table.column("x").unwrap().values[4], Value::Float(2.0));
    }

    #[test]
    fn drop_removes_exactly_the_missing_rows() {
        let t = table(vec![
            Column::new("x", ColumnKind::Numeric, num(&[None, Some(2.0), None, Some(4.0)])),
            Column::new("c", ColumnKind::Text, text(&[Some("a"), Some("b"), Some("c"), Some("d")])),
        ]);
        let out = handle_missing_values(t, ImputeStrategy::Drop, ImputeStrategy::Mode, None);

        assert_eq!(out.table.row_count(), 2);
        assert_eq!(out.table.column("x").unwrap().missing_count(), 0);
        assert_eq!(
            out.table.column("c").unwrap().values,
            text(&[Some("b"), Some("d")])
        );
    }

    #[test]
    fn earlier_drop_changes_later_fill_statistics() {
        // Dropping on `x` removes the row holding c="z", so the mode of the
        // surviving `c` values is "y", not "z".
        let t = table(vec![
            Column::new("x", ColumnKind::Numeric, num(&[None, None, Some(1.0), Some(2.0), Some(3.0)])),
            Column::new(
                "c",
                ColumnKind::Text,
                text(&[Some("z"), Some("z"), Some("y"), None, Some("z")]),
            ),
        ]);
        let out = handle_missing_values(t, ImputeStrategy::Drop, ImputeStrategy::Mode, None);
        let c = &out.table.column("c").unwrap().values;
        assert_eq!(out.table.row_count(), 3);
        // remaining c = ["y", None, "z"] → tie → smallest = "y"
        assert_eq!(c[1], Value::Text("y".into()));
    }

    #[test]
    fn non_numeric_drop_after_numeric_fill() {
        let t = table(vec![
            Column::new("x", ColumnKind::Numeric, num(&[Some(1.0), None, Some(3.0), Some(4.0)])),
            Column::new("c", ColumnKind::Text, text(&[Some("a"), None, Some("b"), None])),
        ]);
        let out = handle_missing_values(t, ImputeStrategy::Mean, ImputeStrategy::Drop, None);

        assert!(out.diagnostics.is_empty());
        assert_eq!(out.table.row_count(), 2);
        assert_eq!(out.table.column("c").unwrap().missing_count(), 0);
        assert_eq!(out.table.column("c").unwrap().values, text(&[Some("a"), Some("b")]));
        assert_eq!(out.table.column("x").unwrap().values, num(&[Some(1.0), Some(3.0)]));
    }

    #[test]
    fn numeric_drop_then_non_numeric_drop() {
        let t = table(vec![
            Column::new(
                "x",
                ColumnKind::Numeric,
                num(&[None, Some(2.0), Some(3.0), Some(4.0), Some(5.0)]),
            ),
            Column::new(
                "c",
                ColumnKind::Text,
                text(&[None, Some("a"), None, Some("b"), Some("c")]),
            ),
        ]);
        let out = handle_missing_values(t, ImputeStrategy::Drop, ImputeStrategy::Drop, None);

        assert_eq!(out.table.row_count(), 3);
        assert_eq!(
            out.table.column("x").unwrap().values,
            num(&[Some(2.0), Some(4.0), Some(5.0)])
        );
        assert_eq!(
            out.table.column("c").unwrap().values,
            text(&[Some("a"), Some("b"), Some("c")])
        );
    }

    #[test]
    fn non_numeric_mean_warns_and_keeps_missing() {
        let t = table(vec![Column::new("c", ColumnKind::Text, text(&[Some("a"), None]))]);
        let out = handle_missing_values(t, ImputeStrategy::Mean, ImputeStrategy::Mean, None);

        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::UnsupportedStrategy {
                column: "c".into(),
                strategy: ImputeStrategy::Mean
            }]
        );
        assert_eq!(out.table.column("c").unwrap().missing_count(), 1);
    }

    #[test]
    fn column_selection_limits_the_stage() {
        let t = table(vec![
            Column::new("x", ColumnKind::Numeric, num(&[None, Some(2.0)])),
            Column::new("y", ColumnKind::Numeric, num(&[None, Some(2.0)])),
        ]);
        let cols = vec!["y".to_string(), "absent".to_string()];
        let out = handle_missing_values(t, ImputeStrategy::Mean, ImputeStrategy::Mode, Some(&cols));

        assert_eq!(out.table.column("x").unwrap().missing_count(), 1);
        assert_eq!(out.table.column("y").unwrap().missing_count(), 0);
    }

    #[test]
    fn all_missing_column_reports_no_fill_value() {
        let t = table(vec![Column::new("x", ColumnKind::Numeric, num(&[None, None]))]);
        let out = handle_missing_values(t, ImputeStrategy::Median, ImputeStrategy::Mode, None);

        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].column(), "x");
        assert_eq!(out.table.column("x").unwrap().missing_count(), 2);
    }
}
