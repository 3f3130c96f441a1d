use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Value – a single cell of a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
///
/// `Value` is used as a key in `BTreeMap` / `HashSet` (mode computation,
/// duplicate detection), so it carries a manual total order in which NaN
/// and signed zeros are canonicalised.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Collapse `-0.0` onto `0.0` and every NaN payload onto one NaN.
fn canonical_f64(v: f64) -> f64 {
    if v.is_nan() {
        f64::NAN
    } else if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl Value {
    /// `Null` and NaN floats both count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Interpret the value as an `f64` for statistics and scaling.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) if !v.is_nan() => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Key used for whole-row equality: all missing values are one key.
    pub fn row_key(&self) -> Value {
        if self.is_missing() {
            Value::Null
        } else {
            self.clone()
        }
    }

    /// Render the value the way it is written to delimited text.
    /// Missing values render as an empty string.
    pub fn to_field(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Float(v) if v.is_nan() => String::new(),
            Value::Float(v) => format_float(*v),
            Value::Integer(i) => i.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

/// Integral floats keep one decimal (`30.0`) so they reload as numeric.
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

// -- Manual Eq/Ord/Hash so Value can live in ordered and hashed sets --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => canonical_f64(*a).total_cmp(&canonical_f64(*b)),
            (Text(a), Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => canonical_f64(*f).to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "<null>"),
            Value::Float(v) if v.is_nan() => write!(f, "NaN"),
            other => write!(f, "{}", other.to_field()),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – the storage tag of a column
// ---------------------------------------------------------------------------

/// Semantic type of a column, fixed at load time and updated only by the
/// stages that change it (normalization, coercion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// `f64` storage; may hold missing values.
    Numeric,
    /// `i64` storage; never holds missing values.
    Integer,
    Text,
    Categorical,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Numeric | ColumnKind::Integer)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Integer => "integer",
            ColumnKind::Text => "text",
            ColumnKind::Categorical => "categorical",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// Tokens read as missing in text sources, in addition to the empty string.
pub const NA_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
    "#NA", "#N/A N/A", "1.#IND", "1.#QNAN", "-1.#IND",
];

fn is_na_token(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || NA_TOKENS.contains(&trimmed)
}

/// A named column of aligned values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Build a column from raw text cells, inferring its kind.
    ///
    /// * all cells parse as `i64` and none is missing → `Integer`
    /// * all non-missing cells parse as `f64`         → `Numeric`
    /// * anything else                                → `Text`
    ///
    /// `None` cells and NA tokens are missing.
    pub fn infer(name: impl Into<String>, raw: Vec<Option<String>>) -> Self {
        let cells: Vec<Option<String>> = raw
            .into_iter()
            .map(|c| c.filter(|s| !is_na_token(s)))
            .collect();

        let any_missing = cells.iter().any(Option::is_none);

        if !any_missing && !cells.is_empty() {
            let ints: Option<Vec<Value>> = cells
                .iter()
                .map(|c| c.as_deref().and_then(|s| s.trim().parse::<i64>().ok()))
                .map(|i| i.map(Value::Integer))
                .collect();
            if let Some(values) = ints {
                return Column::new(name, ColumnKind::Integer, values);
            }
        }

        let floats: Option<Vec<Value>> = cells
            .iter()
            .map(|c| match c {
                None => Some(Value::Null),
                Some(s) => s.trim().parse::<f64>().ok().map(Value::Float),
            })
            .collect();
        if let Some(values) = floats {
            return Column::new(name, ColumnKind::Numeric, values);
        }

        let values = cells
            .into_iter()
            .map(|c| c.map_or(Value::Null, Value::Text))
            .collect();
        Column::new(name, ColumnKind::Text, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Non-missing values as `f64` (numeric columns only yield anything).
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Ordered collection of equally long columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    /// Build a table, checking that every column has the same length and
    /// that names are unique.
    pub fn new(columns: Vec<Column>) -> anyhow::Result<Self> {
        if let Some(first) = columns.first() {
            for col in &columns {
                if col.len() != first.len() {
                    anyhow::bail!(
                        "column '{}' has {} rows but '{}' has {}",
                        col.name,
                        col.len(),
                        first.name,
                        first.len()
                    );
                }
            }
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                anyhow::bail!("duplicate column name '{}'", col.name);
            }
        }
        Ok(Self { columns })
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// `(name, kind)` pairs in column order.
    pub fn schema(&self) -> Vec<(String, ColumnKind)> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.kind))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Values of row `idx` across all columns.
    pub fn row(&self, idx: usize) -> Vec<&Value> {
        self.columns.iter().map(|c| &c.values[idx]).collect()
    }

    /// Keep only the rows whose entry in `keep` is `true`.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.row_count());
        for col in &mut self.columns {
            let mut flags = keep.iter();
            col.values.retain(|_| *flags.next().unwrap_or(&false));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
