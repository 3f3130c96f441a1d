use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::format::Format;
use super::model::{Column, ColumnKind, Table, Value};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – header row, `delimiter`-separated fields
/// * `.tsv`          – header row, tab-separated fields
/// * `.json`         – `[{ "col": value, ... }, ...]`
/// * `.parquet`      – any flat schema
pub fn load(path: &Path, delimiter: u8) -> Result<Table> {
    let format = Format::from_path(path)?;
    let table = match format {
        Format::Delimited | Format::Tsv => load_delimited(path, format.delimiter(delimiter)),
        Format::JsonRecords => load_json(path),
        Format::Parquet => load_parquet(path),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    for (name, kind) in table.schema() {
        log::debug!("  column '{name}': {kind}");
    }
    Ok(table)
}

/// Turn raw text columns into a typed table.
fn table_from_raw(headers: Vec<String>, raw: Vec<Vec<Option<String>>>) -> Result<Table> {
    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::infer(name, cells))
        .collect();
    Table::new(columns)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line.  Ragged records are a
/// parse error.
fn load_delimited(path: &Path, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .context("opening delimited file")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        bail!("file has no header row");
    }

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("record {}", row_no + 1))?;
        for (col_idx, field) in record.iter().enumerate() {
            raw[col_idx].push(Some(field.to_string()));
        }
    }

    table_from_raw(headers, raw)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "id": 1, "age": null, "city": "Oslo" },
///   { "id": 2, "age": 30.5, "city": "Lima" }
/// ]
/// ```
///
/// Columns appear in first-seen key order; a key absent from a record is a
/// missing value.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let raw: Vec<Vec<Option<String>>> = headers
        .iter()
        .map(|key| {
            records
                .iter()
                .map(|rec| rec.get(key).and_then(json_to_cell))
                .collect()
        })
        .collect();

    table_from_raw(headers, raw)
}

fn json_to_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file.  Column kinds follow the Arrow schema:
/// integers → `Integer` (`Numeric` once nulls appear), floats → `Numeric`,
/// strings → `Text`, dictionaries → `Categorical`, anything else → `Text`.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Column> = schema
        .fields()
        .iter()
        .map(|f| Column::new(f.name().clone(), kind_for(f.data_type()), Vec::new()))
        .collect();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (idx, column) in columns.iter_mut().enumerate() {
            append_values(batch.column(idx), column)
                .with_context(|| format!("column '{}'", column.name))?;
        }
    }

    for column in &mut columns {
        if column.kind == ColumnKind::Integer && column.missing_count() > 0 {
            column.kind = ColumnKind::Numeric;
            for v in &mut column.values {
                if let Value::Integer(i) = v {
                    *v = Value::Float(*i as f64);
                }
            }
        }
    }

    Table::new(columns)
}

// -- Arrow helpers --

fn kind_for(data_type: &DataType) -> ColumnKind {
    match data_type {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => ColumnKind::Integer,
        DataType::Float16 | DataType::Float32 | DataType::Float64 => ColumnKind::Numeric,
        DataType::Dictionary(_, _) => ColumnKind::Categorical,
        _ => ColumnKind::Text,
    }
}

/// Append every row of an Arrow array to `column`, converting by kind.
fn append_values(array: &ArrayRef, column: &mut Column) -> Result<()> {
    match column.kind {
        ColumnKind::Integer => {
            let ints = cast(array, &DataType::Int64).context("casting to Int64")?;
            let ints = ints.as_primitive::<Int64Type>();
            column.values.extend(ints.iter().map(|v| v.map_or(Value::Null, Value::Integer)));
        }
        ColumnKind::Numeric => {
            let floats = cast(array, &DataType::Float64).context("casting to Float64")?;
            let floats = floats.as_primitive::<Float64Type>();
            column.values.extend(floats.iter().map(|v| v.map_or(Value::Null, Value::Float)));
        }
        ColumnKind::Text | ColumnKind::Categorical => {
            for row in 0..array.len() {
                if array.is_null(row) {
                    column.values.push(Value::Null);
                } else {
                    let text = array_value_to_string(array, row)
                        .with_context(|| format!("formatting row {row}"))?;
                    column.values.push(Value::Text(text));
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
