//! # Output Formatting
//!
//! - [`text`]: Human-readable report with color-coded scores
//! - [`json`]: A single JSON document for scripts
//!
//! ```bash
//! pulse analyze https://example.com -f json | jq '.scores.performance'
//! ```

mod json;
mod text;

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use pulse_core::Analysis;

pub use json::JsonReport;
pub use text::TextReport;

/// Output format for `pulse analyze`.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Write `analysis` to `out` in the requested format.
pub fn render<W: Write>(
    out: &mut W,
    analysis: &Analysis,
    format: OutputFormat,
    details: bool,
) -> Result<()> {
    match format {
        OutputFormat::Text => TextReport::new(analysis, details).write_to(out),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &JsonReport::new(analysis, details))?;
            writeln!(out)?;
            Ok(())
        },
    }
}
