use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, DictionaryArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Int32Type, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::{Map, Number, Value as JsonValue};

use super::format::Format;
use super::model::{Column, ColumnKind, Table, Value};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write `table` to `path`, picking the format from the extension.
/// No row-index column is ever written.
pub fn save(table: &Table, path: &Path, delimiter: u8) -> Result<()> {
    let format = Format::from_path(path)?;
    match format {
        Format::Delimited | Format::Tsv => save_delimited(table, path, format.delimiter(delimiter)),
        Format::JsonRecords => save_json(table, path),
        Format::Parquet => save_parquet(table, path),
    }
    .with_context(|| format!("saving {}", path.display()))?;

    log::info!(
        "Wrote {} rows x {} columns to {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    log::debug!("  columns: {}", table.column_names().join(", "));
    Ok(())
}

// ---------------------------------------------------------------------------
// Delimited text writer
// ---------------------------------------------------------------------------

fn save_delimited(table: &Table, path: &Path, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .context("creating output file")?;

    writer
        .write_record(table.columns.iter().map(|c| c.name.as_str()))
        .context("writing header row")?;

    for row in 0..table.row_count() {
        writer
            .write_record(table.row(row).iter().map(|v| v.to_field()))
            .with_context(|| format!("writing record {}", row + 1))?;
    }
    writer.flush().context("flushing output file")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON writer
// ---------------------------------------------------------------------------

/// Records-oriented JSON; missing values become `null`.
fn save_json(table: &Table, path: &Path) -> Result<()> {
    let records: Vec<JsonValue> = (0..table.row_count())
        .map(|row| {
            let obj: Map<String, JsonValue> = table
                .columns
                .iter()
                .map(|c| (c.name.clone(), value_to_json(&c.values[row])))
                .collect();
            JsonValue::Object(obj)
        })
        .collect();

    let file = std::fs::File::create(path).context("creating output file")?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &records)
        .context("serializing JSON")?;
    Ok(())
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Integer(i) => JsonValue::from(*i),
        Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Text(s) => JsonValue::String(s.clone()),
    }
}

// ---------------------------------------------------------------------------
// Parquet writer
// ---------------------------------------------------------------------------

/// One record batch holding the whole table.
fn save_parquet(table: &Table, path: &Path) -> Result<()> {
    let fields: Vec<Field> = table
        .columns
        .iter()
        .map(|c| Field::new(c.name.as_str(), arrow_type(c.kind), true))
        .collect();
    let schema = Arc::new(Schema::new(fields));
    let arrays: Vec<ArrayRef> = table.columns.iter().map(to_arrow).collect();

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn arrow_type(kind: ColumnKind) -> DataType {
    match kind {
        ColumnKind::Integer => DataType::Int64,
        ColumnKind::Numeric => DataType::Float64,
        ColumnKind::Text => DataType::Utf8,
        ColumnKind::Categorical => {
            DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8))
        }
    }
}

fn to_arrow(column: &Column) -> ArrayRef {
    match column.kind {
        ColumnKind::Integer => Arc::new(
            column
                .values
                .iter()
                .map(|v| match v {
                    Value::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect::<Int64Array>(),
        ),
        ColumnKind::Numeric => {
            Arc::new(column.values.iter().map(Value::as_f64).collect::<Float64Array>())
        }
        ColumnKind::Text => Arc::new(
            column
                .values
                .iter()
                .map(text_cell)
                .collect::<StringArray>(),
        ),
        ColumnKind::Categorical => {
            let labels: Vec<Option<String>> = column.values.iter().map(text_cell).collect();
            Arc::new(
                labels
                    .iter()
                    .map(|l| l.as_deref())
                    .collect::<DictionaryArray<Int32Type>>(),
            )
        }
    }
}

fn text_cell(value: &Value) -> Option<String> {
    if value.is_missing() {
        None
    } else {
        Some(value.to_field())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load;

    fn sample() -> Table {
        Table::new(vec![
            Column::new("id", ColumnKind::Integer, vec![Value::Integer(1), Value::Integer(2)]),
            Column::new("age", ColumnKind::Numeric, vec![Value::Float(30.0), Value::Null]),
            Column::new(
                "city",
                ColumnKind::Text,
                vec![Value::Text("Oslo, NO".into()), Value::Null],
            ),
            Column::new(
                "grade",
                ColumnKind::Categorical,
                vec![Value::Text("a".into()), Value::Text("b".into())],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn csv_has_header_and_no_index_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        save(&sample(), &path, b',').unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,age,city,grade");
        assert_eq!(lines[1], "1,30.0,\"Oslo, NO\",a");
        assert_eq!(lines[2], "2,,,b");
    }

    #[test]
    fn csv_round_trip_keeps_names_rows_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = sample();
        save(&table, &path, b',').unwrap();

        let back = load(&path, b',').unwrap();
        assert_eq!(back.column_names(), table.column_names());
        assert_eq!(back.row_count(), table.row_count());
        assert_eq!(back.column("id").unwrap().values, table.column("id").unwrap().values);
        assert_eq!(back.column("age").unwrap().values, table.column("age").unwrap().values);
        // Categorical relabels to text through a text format.
        assert_eq!(back.column("grade").unwrap().kind, ColumnKind::Text);
    }

    #[test]
    fn parquet_round_trip_keeps_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        let table = sample();
        save(&table, &path, b',').unwrap();

        let back = load(&path, b',').unwrap();
        assert_eq!(back.schema(), table.schema());
        assert_eq!(back, table);
    }

    #[test]
    fn json_round_trip_writes_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        save(&sample(), &path, b',').unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"age\": null"));
        let back = load(&path, b',').unwrap();
        assert_eq!(back.row_count(), 2);
        assert_eq!(back.column("age").unwrap().missing_count(), 1);
    }

    #[test]
    fn unwritable_destination_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("out.csv");
        assert!(save(&sample(), &path, b',').is_err());
    }
}
