//! Analysis orchestration: input validation, cache lookup, provider call, and
//! the `Idle → Loading → Success | Error` state machine.
//!
//! A submission is split into three steps so overlapping submissions can be
//! reasoned about:
//!
//! 1. [`Analyzer::begin`] validates and checks the cache. It either settles the
//!    state immediately or hands back a [`PendingFetch`] ticket.
//! 2. [`Analyzer::fetch`] performs the single provider call for a ticket.
//! 3. [`Analyzer::finish`] caches a successful result and applies the outcome,
//!    unless a newer submission has started since the ticket was issued.
//!
//! [`Analyzer::submit`] runs all three in sequence.

use tracing::{debug, info};
use url::Url;

use crate::assessment::{Assessment, assess};
use crate::cache::{ExpiringCache, KeyValueStore};
use crate::export::{MetricRow, to_table};
use crate::fetcher::AnalysisProvider;
use crate::suggestions::{PositiveFeedback, Suggestion, derive_positive_feedback, derive_suggestions};
use crate::{AnalysisResult, Error, Result};

/// Message shown for input that is not an absolute http(s) URL.
pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL, e.g. https://example.com";

/// Where a successful result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    /// Served from the local cache without a network call.
    Cache,
    /// Fetched from the provider during this submission.
    Network,
}

/// A completed analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Normalized URL the analysis is keyed by.
    pub url: String,
    /// Where the result came from.
    pub source: ResultSource,
    /// The provider's report.
    pub result: AnalysisResult,
}

impl Analysis {
    /// Categories needing improvement.
    #[must_use]
    pub fn suggestions(&self) -> Vec<Suggestion> {
        derive_suggestions(&self.result)
    }

    /// Categories that scored well.
    #[must_use]
    pub fn positive_feedback(&self) -> Vec<PositiveFeedback> {
        derive_positive_feedback(&self.result)
    }

    /// Tiered narrative summary.
    #[must_use]
    pub fn assessment(&self) -> Assessment {
        assess(&self.result)
    }

    /// Metric table for export.
    #[must_use]
    pub fn table(&self) -> Vec<MetricRow> {
        to_table(&self.result)
    }
}

/// Orchestrator state.
#[derive(Debug, Default)]
pub enum AnalysisState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Waiting on the provider for `url`.
    Loading {
        /// Normalized URL being analyzed.
        url: String,
    },
    /// The latest submission succeeded.
    Success(Box<Analysis>),
    /// The latest submission failed.
    Error(Error),
}

impl AnalysisState {
    /// The analysis, when in `Success`.
    #[must_use]
    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            Self::Success(analysis) => Some(analysis),
            _ => None,
        }
    }

    /// The error, when in `Error`.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Whether a provider call is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

/// Ticket for a submission that missed the cache.
#[derive(Debug)]
#[must_use = "a pending fetch does nothing until passed to fetch() and finish()"]
pub struct PendingFetch {
    generation: u64,
    url: Url,
}

impl PendingFetch {
    /// Submission number this ticket belongs to.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Normalized target URL.
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

/// What [`Analyzer::begin`] decided.
#[derive(Debug)]
pub enum Step {
    /// The state is already final (validation error or cache hit).
    Settled,
    /// The provider must be called.
    Fetch(PendingFetch),
}

/// Per-submission options.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitOptions {
    /// Skip the cache lookup. The fresh result is still cached.
    pub refresh: bool,
}

/// Coordinates cache and provider for one user at a time.
pub struct Analyzer<P, S> {
    provider: P,
    cache: ExpiringCache<S>,
    state: AnalysisState,
    generation: u64,
}

impl<P, S> Analyzer<P, S>
where
    P: AnalysisProvider,
    S: KeyValueStore,
{
    /// Build an orchestrator from its collaborators.
    pub fn new(provider: P, cache: ExpiringCache<S>) -> Self {
        Self {
            provider,
            cache,
            state: AnalysisState::Idle,
            generation: 0,
        }
    }

    /// Current state.
    pub const fn state(&self) -> &AnalysisState {
        &self.state
    }

    /// Take the current state, leaving `Idle` behind.
    pub fn take_state(&mut self) -> AnalysisState {
        std::mem::take(&mut self.state)
    }

    /// The cache this orchestrator reads and writes.
    pub const fn cache(&self) -> &ExpiringCache<S> {
        &self.cache
    }

    /// Number of submissions started so far.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a submission: validate, then consult the cache.
    pub fn begin(&mut self, input: &str, options: SubmitOptions) -> Step {
        self.generation += 1;

        let url = match validate_url(input) {
            Ok(url) => url,
            Err(err) => {
                debug!("Rejected input {:?}: {}", input, err);
                self.state = AnalysisState::Error(err);
                return Step::Settled;
            },
        };
        let key = url.to_string();

        if options.refresh {
            debug!("Refresh requested for {}, skipping cache", key);
        } else if let Some(result) = self.cache.get(&key) {
            info!("Serving {} from cache", key);
            self.state = AnalysisState::Success(Box::new(Analysis {
                url: key,
                source: ResultSource::Cache,
                result,
            }));
            return Step::Settled;
        }

        self.state = AnalysisState::Loading { url: key };
        Step::Fetch(PendingFetch {
            generation: self.generation,
            url,
        })
    }

    /// Call the provider for a pending submission.
    pub async fn fetch(&self, pending: &PendingFetch) -> Result<AnalysisResult> {
        self.provider.analyze(&pending.url).await
    }

    /// Complete a submission with the provider's outcome.
    ///
    /// Successful results are cached even when stale. Returns `false` when a
    /// newer submission has started, in which case the state is left alone.
    pub fn finish(&mut self, pending: PendingFetch, outcome: Result<AnalysisResult>) -> bool {
        let key = pending.url.to_string();

        if let Ok(result) = &outcome {
            self.cache.put(&key, result);
        }

        if pending.generation != self.generation {
            debug!(
                "Discarding result for {} from submission {} (latest is {})",
                key, pending.generation, self.generation
            );
            return false;
        }

        self.state = match outcome {
            Ok(result) => AnalysisState::Success(Box::new(Analysis {
                url: key,
                source: ResultSource::Network,
                result,
            })),
            Err(err) => AnalysisState::Error(err),
        };
        true
    }

    /// Run a whole submission and return the resulting state.
    pub async fn submit(&mut self, input: &str, options: SubmitOptions) -> &AnalysisState {
        if let Step::Fetch(pending) = self.begin(input, options) {
            let outcome = self.fetch(&pending).await;
            self.finish(pending, outcome);
        }
        &self.state
    }
}

/// Parse and normalize user input into an absolute http(s) URL with a host.
pub fn validate_url(input: &str) -> Result<Url> {
    let invalid = || Error::Validation(INVALID_URL_MESSAGE.to_string());

    let url = Url::parse(input.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid());
    }
    Ok(url)
}
