//! Pipeline configuration.
//!
//! A [`PipelineConfig`] is read from a TOML file and/or assembled from
//! command-line flags, validated once, and handed to
//! [`crate::pipeline::run`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::clean::{ImputeStrategy, TargetType};
use crate::data::format::Format;
use crate::error::ConfigError;

/// Everything the pipeline needs to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub input: PathBuf,
    #[serde(default)]
    pub output: PathBuf,
    /// Field delimiter for `.csv` / `.txt` files.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_true")]
    pub deduplicate: bool,
    #[serde(default)]
    pub missing: MissingSettings,
    #[serde(default)]
    pub normalize: NormalizeSettings,
    /// Column name → target type, applied after normalization in the
    /// order the entries are written.
    #[serde(
        default,
        deserialize_with = "ordered_types",
        serialize_with = "types_as_table"
    )]
    pub types: Vec<(String, TargetType)>,
}

/// Missing-value handling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MissingSettings {
    #[serde(default = "default_numeric_strategy")]
    pub numeric_strategy: ImputeStrategy,
    #[serde(default = "default_non_numeric_strategy")]
    pub non_numeric_strategy: ImputeStrategy,
    /// Restrict the stage to these columns; all columns when absent.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

/// Min-max normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizeSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Restrict scaling to these columns; all numeric columns when absent.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

/// Read the `[types]` table keeping its entries in document order.
fn ordered_types<'de, D>(deserializer: D) -> Result<Vec<(String, TargetType)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TypesVisitor;

    impl<'de> Visitor<'de> for TypesVisitor {
        type Value = Vec<(String, TargetType)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a table of column = type entries")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut types = Vec::new();
            while let Some(entry) = map.next_entry::<String, TargetType>()? {
                types.push(entry);
            }
            Ok(types)
        }
    }

    deserializer.deserialize_map(TypesVisitor)
}

fn types_as_table<S>(types: &[(String, TargetType)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(types.iter().map(|(column, target)| (column, target)))
}

fn default_delimiter() -> char {
    ','
}

fn default_true() -> bool {
    true
}

fn default_numeric_strategy() -> ImputeStrategy {
    ImputeStrategy::Mean
}

fn default_non_numeric_strategy() -> ImputeStrategy {
    ImputeStrategy::Mode
}

impl Default for MissingSettings {
    fn default() -> Self {
        Self {
            numeric_strategy: default_numeric_strategy(),
            non_numeric_strategy: default_non_numeric_strategy(),
            columns: None,
        }
    }
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            columns: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::new(),
            delimiter: default_delimiter(),
            deduplicate: true,
            missing: MissingSettings::default(),
            normalize: NormalizeSettings::default(),
            types: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Map `column` to `target`, replacing an earlier entry for the same
    /// column in place.
    pub fn set_type(&mut self, column: String, target: TargetType) {
        match self.types.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = target,
            None => self.types.push((column, target)),
        }
    }

    /// Check the configuration before any file is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath("input"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath("output"));
        }
        Format::from_path(&self.input)?;
        Format::from_path(&self.output)?;

        if !self.delimiter.is_ascii() {
            return Err(ConfigError::InvalidDelimiter(self.delimiter));
        }

        let has_empty = |cols: &Option<Vec<String>>| {
            cols.as_ref()
                .is_some_and(|c| c.iter().any(|n| n.trim().is_empty()))
        };
        if has_empty(&self.missing.columns) {
            return Err(ConfigError::EmptyColumnName("missing-value"));
        }
        if has_empty(&self.normalize.columns) {
            return Err(ConfigError::EmptyColumnName("normalize"));
        }
        if self.types.iter().any(|(n, _)| n.trim().is_empty()) {
            return Err(ConfigError::EmptyColumnName("type mapping"));
        }
        Ok(())
    }

    /// Delimiter as the byte the csv reader/writer expects.  Only valid
    /// after [`validate`](Self::validate).
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}
