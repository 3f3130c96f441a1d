use thiserror::Error;

// ---------------------------------------------------------------------------
// Domain errors
// ---------------------------------------------------------------------------

/// Errors raised by the cleaning stages and by value parsing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CleanError {
    #[error("column '{column}' not found in table")]
    ColumnNotFound { column: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("unknown missing-value strategy '{0}' (expected mean, median, mode or drop)")]
    InvalidStrategy(String),

    #[error("unknown column type '{0}' (expected numeric, integer, text or categorical)")]
    InvalidType(String),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors raised while reading or validating a [`crate::config::PipelineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("no {0} path configured")]
    MissingPath(&'static str),

    #[error("delimiter '{0}' must be a single ASCII character")]
    InvalidDelimiter(char),

    #[error("empty column name in {0} selection")]
    EmptyColumnName(&'static str),

    #[error(transparent)]
    Clean(#[from] CleanError),
}
