//! Command implementations for the pulse CLI

mod analyze;
mod cache;
mod completions;
mod config;
mod export;

pub use analyze::run as analyze;
pub use cache::run_clear as clear_cache;
pub use completions::generate;
pub use config::{show_path as config_path, show as show_config};
pub use export::run as export;

use anyhow::{Result, bail};
use pulse_core::{
    Analysis, AnalysisState, Analyzer, Config, ExpiringCache, FileStore, PageSpeedClient,
    SubmitOptions,
};

/// Build an orchestrator from the effective configuration.
fn analyzer(config: &Config) -> Result<Analyzer<PageSpeedClient, FileStore>> {
    let client = PageSpeedClient::new(&config.api)?;
    let cache = ExpiringCache::new(FileStore::new(&config.cache.dir)).with_ttl(config.cache.ttl());
    Ok(Analyzer::new(client, cache))
}

/// Run one submission and turn a failed state into an error.
async fn analyze_once(config: &Config, url: &str, refresh: bool) -> Result<Analysis> {
    let mut analyzer = analyzer(config)?;
    analyzer.submit(url, SubmitOptions { refresh }).await;

    match analyzer.take_state() {
        AnalysisState::Success(analysis) => Ok(*analysis),
        AnalysisState::Error(err) => Err(err.into()),
        AnalysisState::Idle | AnalysisState::Loading { .. } => {
            bail!("analysis did not complete")
        },
    }
}
