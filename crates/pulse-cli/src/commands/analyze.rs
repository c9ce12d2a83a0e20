//! `pulse analyze`

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use colored::Colorize;
use pulse_core::{Analysis, Config};
use tracing::info;

use crate::cli::AnalyzeArgs;
use crate::output::{OutputFormat, render};

/// Analyze a URL and print the report to stdout.
///
/// # Errors
///
/// Returns an error if the URL is invalid, the analysis fails, or the
/// screenshot cannot be written.
pub async fn run(config: &Config, args: &AnalyzeArgs) -> Result<()> {
    let analysis = super::analyze_once(config, &args.url, args.refresh).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&mut out, &analysis, args.format, args.details)?;

    if let Some(path) = &args.screenshot {
        save_screenshot(&analysis, path)?;
        if args.format == OutputFormat::Text {
            writeln!(out, "\n{} Screenshot saved to {}", "✓".green(), path.display())?;
        }
    }
    Ok(())
}

/// Decode the full-page screenshot into `path`.
fn save_screenshot(analysis: &Analysis, path: &Path) -> Result<()> {
    let encoded = analysis
        .result
        .screenshot_base64()
        .ok_or_else(|| anyhow!("The analysis does not include a screenshot"))?;
    let bytes = STANDARD
        .decode(encoded.trim())
        .context("Screenshot data is not valid base64")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} byte screenshot to {}", bytes.len(), path.display());
    Ok(())
}
