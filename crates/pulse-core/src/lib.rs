//! # pulse-core
//!
//! Core functionality for pulse - website quality analysis backed by the
//! PageSpeed Insights API.
//!
//! This crate validates a URL, fetches a Lighthouse report for it (or serves a
//! cached one less than an hour old), and derives everything a user needs from
//! the report: category scores, improvement suggestions, positive feedback, a
//! narrative assessment, and a spreadsheet-ready metric table.
//!
//! ## Architecture
//!
//! - **Analyzer**: Validation, cache lookup, and the single provider call per
//!   submission, exposed as an `Idle → Loading → Success | Error` state
//! - **Fetcher**: The PageSpeed Insights HTTP client behind the
//!   [`AnalysisProvider`] trait
//! - **Cache**: Time-bound result cache over a pluggable key-value store
//! - **Suggestions / Assessment**: Pure derivations over an [`AnalysisResult`]
//! - **Export**: XLSX and CSV encodings of the audit table
//! - **Configuration**: TOML settings with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pulse_core::{Analyzer, Config, ExpiringCache, FileStore, PageSpeedClient, SubmitOptions};
//!
//! # async fn run() -> pulse_core::Result<()> {
//! let config = Config::load()?;
//! let client = PageSpeedClient::new(&config.api)?;
//! let cache = ExpiringCache::new(FileStore::new(&config.cache.dir)).with_ttl(config.cache.ttl());
//!
//! let mut analyzer = Analyzer::new(client, cache);
//! if let Some(analysis) = analyzer
//!     .submit("https://example.com", SubmitOptions::default())
//!     .await
//!     .analysis()
//! {
//!     for suggestion in analysis.suggestions() {
//!         println!("{}: {:?}", suggestion.category, suggestion.items);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`]. Errors carry a
//! category and a recoverability hint:
//!
//! ```rust
//! use pulse_core::{Error, analyzer::validate_url};
//!
//! match validate_url("not a url") {
//!     Ok(url) => println!("Analyzing {url}"),
//!     Err(Error::Validation(msg)) => eprintln!("{msg}"),
//!     Err(e) if e.is_recoverable() => eprintln!("Try again: {e}"),
//!     Err(e) => eprintln!("Failed: {e}"),
//! }
//! ```

/// Submission orchestration and URL validation
pub mod analyzer;
/// Tiered narrative assessment
pub mod assessment;
/// Time-bound result cache
pub mod cache;
/// Configuration loading and environment overrides
pub mod config;
/// Error types and result aliases
pub mod error;
/// Spreadsheet export of audit metrics
pub mod export;
/// PageSpeed Insights HTTP client
pub mod fetcher;
/// Suggestions and positive feedback
pub mod suggestions;
/// Report data model
pub mod types;

// Re-export commonly used types
pub use analyzer::{Analysis, AnalysisState, Analyzer, ResultSource, SubmitOptions};
pub use cache::{ExpiringCache, FileStore, KeyValueStore, MemoryStore};
pub use config::{ApiConfig, CacheConfig, Config};
pub use error::{Error, Result};
pub use fetcher::{AnalysisProvider, PageSpeedClient};
pub use types::*;
