use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::clean::{
    Cleaned, Diagnostic, handle_missing_values, normalize_data, remove_duplicates,
    transform_data_types,
};
use crate::config::PipelineConfig;
use crate::data::model::{ColumnKind, Table};
use crate::data::{loader, writer};

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub duplicates_removed: usize,
    pub columns: Vec<(String, ColumnKind)>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating report {}", path.display()))?;
        serde_json::to_writer_pretty(file, self).context("serializing run report")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Load, clean and save according to `config`.
///
/// Stages always run in this order:
/// missing values → duplicates → normalization → type coercion.
pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    let delimiter = config.delimiter_byte();
    let table = loader::load(&config.input, delimiter)?;
    let rows_before = table.row_count();

    let (table, report) = clean(table, config, rows_before)?;

    writer::save(&table, &config.output, delimiter)?;
    Ok(report)
}

/// The in-memory part of [`run`]: every stage, no I/O.
pub fn clean(table: Table, config: &PipelineConfig, rows_before: usize) -> Result<(Table, RunReport)> {
    let mut diagnostics = Vec::new();

    let Cleaned { table, diagnostics: found } = handle_missing_values(
        table,
        config.missing.numeric_strategy,
        config.missing.non_numeric_strategy,
        config.missing.columns.as_deref(),
    );
    log_stage("missing values", &table, &found);
    diagnostics.extend(found);

    let (table, duplicates_removed) = if config.deduplicate {
        let (table, removed) = remove_duplicates(table);
        log_stage("duplicates", &table, &[]);
        (table, removed)
    } else {
        (table, 0)
    };

    let table = if config.normalize.enabled {
        let Cleaned { table, diagnostics: found } =
            normalize_data(table, config.normalize.columns.as_deref())
                .context("normalizing columns")?;
        log_stage("normalization", &table, &found);
        diagnostics.extend(found);
        table
    } else {
        table
    };

    let table = if config.types.is_empty() {
        table
    } else {
        let Cleaned { table, diagnostics: found } = transform_data_types(table, &config.types);
        log_stage("type coercion", &table, &found);
        diagnostics.extend(found);
        table
    };

    let report = RunReport {
        rows_before,
        rows_after: table.row_count(),
        duplicates_removed,
        columns: table.schema(),
        diagnostics,
    };
    Ok((table, report))
}

fn log_stage(stage: &str, table: &Table, diagnostics: &[Diagnostic]) {
    log::info!(
        "{stage}: {} rows x {} columns",
        table.row_count(),
        table.column_count()
    );
    for d in diagnostics {
        log::warn!("{d}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
