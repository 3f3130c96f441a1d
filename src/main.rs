mod clean;
mod cli;
mod config;
mod data;
mod error;
mod pipeline;

use std::collections::BTreeSet;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let report_path = cli.report.clone();
    let config = cli.into_config()?;

    let report = pipeline::run(&config)?;
    log::info!(
        "{} rows in, {} rows out ({} duplicates removed), {} warnings",
        report.rows_before,
        report.rows_after,
        report.duplicates_removed,
        report.diagnostics.len()
    );

    let warned: BTreeSet<&str> = report.diagnostics.iter().map(|d| d.column()).collect();
    if !warned.is_empty() {
        log::warn!(
            "Columns with warnings: {}",
            warned.into_iter().collect::<Vec<_>>().join(", ")
        );
    }

    if let Some(path) = report_path {
        report.write_json(&path)?;
    }

    println!("Data cleaning and preprocessing complete.");
    Ok(())
}
