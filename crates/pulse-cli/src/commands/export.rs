//! `pulse export`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use colored::Colorize;
use pulse_core::export::{ExportFormat, encode, export_file_name};
use pulse_core::{Analysis, Config};
use tracing::debug;

use crate::cli::ExportArgs;

/// Analyze a URL and write its metric table to `<out-dir>/pagespeed-report-<date>.<ext>`.
///
/// # Errors
///
/// Returns an error if the analysis fails or the report cannot be written.
pub async fn run(config: &Config, args: &ExportArgs) -> Result<()> {
    let analysis = super::analyze_once(config, &args.url, args.refresh).await?;
    let format = ExportFormat::from(args.format);
    let path = write_report(&analysis, format, &args.out_dir, Local::now().date_naive())?;

    println!(
        "{} Exported {} metrics for {} to {}",
        "✓".green(),
        analysis.table().len(),
        analysis.url,
        path.display()
    );
    Ok(())
}

/// Encode the table and write it into `out_dir`, returning the file path.
fn write_report(
    analysis: &Analysis,
    format: ExportFormat,
    out_dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf> {
    let bytes = encode(format, &analysis.table(), date)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let path = out_dir.join(export_file_name(format, date));
    fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}
