//! # CLI Structure and Argument Parsing
//!
//! `pulse` audits a website with PageSpeed Insights and reports category
//! scores, suggested improvements, and a narrative assessment.
//!
//! ## Usage Patterns
//!
//! ```bash
//! # Analyze (served from cache when analyzed within the last hour)
//! pulse analyze https://example.com
//! pulse analyze https://example.com --details --format json
//!
//! # Export the audit table
//! pulse export https://example.com --format csv --out-dir reports/
//!
//! # Housekeeping
//! pulse cache clear --force
//! pulse config show
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use pulse_core::export::ExportFormat;

use crate::output::OutputFormat;

/// Main CLI structure for the `pulse` command
#[derive(Parser, Clone, Debug)]
#[command(name = "pulse")]
#[command(version)]
#[command(about = "pulse - Website quality analysis with PageSpeed Insights", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Analyze a website and report scores, suggestions, and an assessment
    Analyze(AnalyzeArgs),

    /// Analyze a website and write the audit table to a spreadsheet
    Export(ExportArgs),

    /// Manage cached analysis results
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Clone, Debug)]
pub struct AnalyzeArgs {
    /// Website URL, e.g. <https://example.com>
    pub url: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Ignore any cached result (the fresh result is still cached)
    #[arg(long)]
    pub refresh: bool,

    /// Include every scored audit and field data in the report
    #[arg(long)]
    pub details: bool,

    /// Save the full-page screenshot to this path
    #[arg(long, value_name = "PATH")]
    pub screenshot: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct ExportArgs {
    /// Website URL, e.g. <https://example.com>
    pub url: String,

    /// Spreadsheet format
    #[arg(short = 'f', long, value_enum, default_value = "xlsx")]
    pub format: ExportFormatArg,

    /// Directory to write the report into
    #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Ignore any cached result (the fresh result is still cached)
    #[arg(long)]
    pub refresh: bool,
}

/// Spreadsheet formats accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormatArg {
    Xlsx,
    Csv,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Xlsx => Self::Xlsx,
            ExportFormatArg::Csv => Self::Csv,
        }
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum CacheCommands {
    /// Delete every cached analysis
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (API key redacted)
    Show,
    /// Print the configuration file path
    Path,
}
