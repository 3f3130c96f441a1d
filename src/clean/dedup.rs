use std::collections::HashSet;

use crate::data::model::{Table, Value};

/// Drop rows that repeat an earlier row across every column, keeping the
/// first occurrence.  Survivors keep their relative order.  Missing values
/// compare equal to each other.
///
/// Returns the deduplicated table and the number of rows removed.
pub fn remove_duplicates(mut table: Table) -> (Table, usize) {
    let rows = table.row_count();
    let mut seen: HashSet<Vec<Value>> = HashSet::with_capacity(rows);

    let keep: Vec<bool> = (0..rows)
        .map(|row| {
            let key: Vec<Value> = table.row(row).into_iter().map(Value::row_key).collect();
            seen.insert(key)
        })
        .collect();

    let removed = keep.iter().filter(|k| !**k).count();
    if removed > 0 {
        table.retain_rows(&keep);
    }
    log::debug!("removed {removed} duplicate rows");
    (table, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnKind};

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|v| Value::Integer(*v)).collect()
    }

    #[test]
    fn keeps_first_occurrence_in_order() {
        let table = Table::new(vec![
            Column::new("a", ColumnKind::Integer, ints(&[3, 1, 3, 2, 1])),
            Column::new("b", ColumnKind::Integer, ints(&[0, 0, 0, 0, 0])),
        ])
        .unwrap();
        let (out, removed) = remove_duplicates(table);

        assert_eq!(removed, 2);
        assert_eq!(out.column("a").unwrap().values, ints(&[3, 1, 2]));
    }

    #[test]
    fn rows_differing_in_one_column_survive() {
        let table = Table::new(vec![
            Column::new("a", ColumnKind::Integer, ints(&[1, 1])),
            Column::new("b", ColumnKind::Integer, ints(&[1, 2])),
        ])
        .unwrap();
        let (out, removed) = remove_duplicates(table);
        assert_eq!(removed, 0);
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn missing_values_match_each_other() {
        let table = Table::new(vec![
            Column::new("id", ColumnKind::Integer, ints(&[1, 1])),
            Column::new(
                "age",
                ColumnKind::Numeric,
                vec![Value::Null, Value::Float(f64::NAN)],
            ),
        ])
        .unwrap();
        let (out, removed) = remove_duplicates(table);
        assert_eq!(removed, 1);
        assert_eq!(out.row_count(), 1);
    }

    #[test]
    fn output_has_no_identical_rows() {
        let table = Table::new(vec![Column::new(
            "t",
            ColumnKind::Text,
            ["x", "y", "x", "x", "z", "y"]
                .iter()
                .map(|s| Value::Text(s.to_string()))
                .collect(),
        )])
        .unwrap();
        let (out, _) = remove_duplicates(table);

        let rows: Vec<Vec<&Value>> = (0..out.row_count()).map(|r| out.row(r)).collect();
        for (i, a) in rows.iter().enumerate() {
            for b in &rows[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(rows.len(), 3);
    }
}
