use std::path::PathBuf;

use clap::Parser;

use crate::clean::{ImputeStrategy, TargetType};
use crate::config::PipelineConfig;
use crate::error::ConfigError;

/// Clean a tabular data file: impute missing values, drop duplicate rows,
/// min-max normalize numeric columns and optionally coerce column types.
#[derive(Parser, Debug)]
#[command(name = "rusty-scrub", version, about)]
pub struct Cli {
    /// TOML configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Input table (.csv, .tsv, .txt, .json, .parquet)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output table (.csv, .tsv, .txt, .json, .parquet)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Strategy for numeric columns: mean, median, mode or drop
    #[arg(long)]
    pub numeric_strategy: Option<ImputeStrategy>,

    /// Strategy for non-numeric columns: mode or drop
    #[arg(long)]
    pub non_numeric_strategy: Option<ImputeStrategy>,

    /// Comma-separated columns for missing-value handling (default: all)
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Comma-separated columns to normalize (default: all numeric)
    #[arg(long, value_delimiter = ',')]
    pub normalize_columns: Option<Vec<String>>,

    /// Skip min-max normalization
    #[arg(long)]
    pub no_normalize: bool,

    /// Keep duplicate rows
    #[arg(long)]
    pub no_dedup: bool,

    /// Coerce a column, e.g. `--cast age=integer` (repeatable)
    #[arg(long = "cast", value_name = "COLUMN=TYPE", value_parser = parse_cast)]
    pub casts: Vec<(String, TargetType)>,

    /// Field delimiter for .csv/.txt files
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Write the run report as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

fn parse_cast(s: &str) -> Result<(String, TargetType), String> {
    let (column, ty) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=TYPE, got '{s}'"))?;
    let target = ty.parse::<TargetType>().map_err(|e| e.to_string())?;
    Ok((column.trim().to_string(), target))
}

impl Cli {
    /// Build the pipeline configuration: the config file (if any) with
    /// every flag given on the command line applied on top.
    pub fn into_config(self) -> Result<PipelineConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        if let Some(strategy) = self.numeric_strategy {
            config.missing.numeric_strategy = strategy;
        }
        if let Some(strategy) = self.non_numeric_strategy {
            config.missing.non_numeric_strategy = strategy;
        }
        if let Some(columns) = self.columns {
            config.missing.columns = Some(columns);
        }
        if let Some(columns) = self.normalize_columns {
            config.normalize.columns = Some(columns);
        }
        if self.no_normalize {
            config.normalize.enabled = false;
        }
        if self.no_dedup {
            config.deduplicate = false;
        }
        for (column, target) in self.casts {
            config.set_type(column, target);
        }

        config.validate()?;
        Ok(config)
    }
}
