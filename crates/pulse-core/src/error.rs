//! Error types and handling for pulse-core operations.
//!
//! Errors fall into two groups. The analysis errors are the ones a user sees at
//! the end of a submission:
//!
//! - **Validation**: the input is not an absolute http(s) URL
//! - **Transport**: the request failed or the provider answered with a non-success status
//! - **Contract**: a response arrived but did not carry the expected envelope
//!
//! The remaining variants cover the ambient machinery (cache files, config,
//! serialization, export encoders). `CacheRead` exists so the cache can name
//! what went wrong in its logs; the cache itself never returns it to callers.
//!
//! ```rust
//! use pulse_core::Error;
//!
//! let err = Error::Validation("Please enter a valid URL".to_string());
//! assert_eq!(err.category(), "validation");
//! assert!(!err.is_recoverable());
//! ```

use thiserror::Error;

/// Generic message shown when the provider gives no usable error detail.
pub const GENERIC_ANALYSIS_FAILURE: &str =
    "Failed to analyze website. Please check the URL and try again.";

/// The main error type for pulse-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The submitted input is not a well-formed absolute URL.
    ///
    /// Reported before any cache or network access takes place.
    #[error("{0}")]
    Validation(String),

    /// The analysis request failed before or after reaching the provider.
    ///
    /// `status` is the HTTP status when the provider answered at all. The
    /// message is taken from the provider's error body when one is present.
    #[error("{message}")]
    Transport {
        /// HTTP status returned by the provider, if any.
        status: Option<u16>,
        /// User-facing description of the failure.
        message: String,
    },

    /// The provider answered successfully but without a usable result envelope.
    #[error("Unexpected response from analysis provider: {0}")]
    Contract(String),

    /// A cached entry could not be read or decoded.
    ///
    /// Only ever logged; cache lookups treat this as a miss.
    #[error("Cache read error: {0}")]
    CacheRead(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache storage operation failed (directory creation, atomic writes).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Spreadsheet or CSV encoding failed.
    #[error("Export error: {0}")]
    Export(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

impl Error {
    /// Build a transport error with the generic user-facing message.
    #[must_use]
    pub fn transport_generic(status: Option<u16>) -> Self {
        Self::Transport {
            status,
            message: GENERIC_ANALYSIS_FAILURE.to_string(),
        }
    }

    /// Check if the error might go away if the user submits again.
    ///
    /// Nothing in pulse retries on its own; this only informs how the CLI
    /// phrases the failure.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport { status, .. } => match status {
                None => true,
                Some(code) => *code == 429 || *code >= 500,
            },
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Whether this error belongs to the analysis taxonomy shown to users.
    #[must_use]
    pub const fn is_analysis_failure(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Transport { .. } | Self::Contract(_)
        )
    }

    /// Get the error category as a string identifier for logs and JSON output.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Transport { .. } => "transport",
            Self::Contract(_) => "contract",
            Self::CacheRead(_) => "cache_read",
            Self::Io(_) => "io",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::Export(_) => "export",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
