//! Cleaning stages.
//!
//! Each stage takes a [`Table`] by value and hands back the transformed
//! table together with the recoverable problems it met along the way:
//!
//! ```text
//!  handle_missing_values → remove_duplicates → normalize_data → transform_data_types
//! ```

use std::fmt;

use serde::Serialize;

use crate::data::model::Table;

pub mod coerce;
pub mod dedup;
pub mod missing;
pub mod normalize;
pub mod stats;

pub use coerce::{TargetType, transform_data_types};
pub use dedup::remove_duplicates;
pub use missing::{ImputeStrategy, handle_missing_values};
pub use normalize::normalize_data;

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// A recoverable problem reported by a stage.  The table is still valid;
/// the affected column was left untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Non-numeric column asked to use a numeric-only strategy.
    UnsupportedStrategy { column: String, strategy: ImputeStrategy },
    /// No non-missing values to compute a fill statistic from.
    NoFillValue { column: String, strategy: ImputeStrategy },
    /// Explicitly selected column is not numeric.
    NotNumeric { column: String },
    /// Coercion to `target` failed on some value.
    CoercionFailed { column: String, target: TargetType, reason: String },
    /// Type mapping names a column the table does not have.
    ColumnNotFound { column: String },
}

impl Diagnostic {
    pub fn column(&self) -> &str {
        match self {
            Diagnostic::UnsupportedStrategy { column, .. }
            | Diagnostic::NoFillValue { column, .. }
            | Diagnostic::NotNumeric { column }
            | Diagnostic::CoercionFailed { column, .. }
            | Diagnostic::ColumnNotFound { column } => column,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedStrategy { column, strategy } => write!(
                f,
                "Non-numeric column '{column}' can only be filled with 'mode' or 'drop' strategy (got '{strategy}')."
            ),
            Diagnostic::NoFillValue { column, strategy } => write!(
                f,
                "Column '{column}' has no values to compute a {strategy} from; missing values kept."
            ),
            Diagnostic::NotNumeric { column } => {
                write!(f, "Column '{column}' is not numeric and was not normalized.")
            }
            Diagnostic::CoercionFailed { column, target, reason } => {
                write!(f, "Unable to convert column '{column}' to {target}: {reason}")
            }
            Diagnostic::ColumnNotFound { column } => {
                write!(f, "Column '{column}' not found in table.")
            }
        }
    }
}

/// A stage's output: the table plus whatever it had to warn about.
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub table: Table,
    pub diagnostics: Vec<Diagnostic>,
}
