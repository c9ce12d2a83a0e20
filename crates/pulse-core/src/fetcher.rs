use crate::config::ApiConfig;
use crate::{AnalysisResult, Category, Error, Result, Strategy};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

/// Default PageSpeed Insights v5 endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// Something that can run an analysis for a URL.
///
/// The orchestrator only depends on this seam, so tests can substitute a fake.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Analyze `target`, issuing at most one request.
    async fn analyze(&self, target: &Url) -> Result<AnalysisResult>;
}

/// HTTP client for the PageSpeed Insights API
pub struct PageSpeedClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    strategy: Strategy,
    screenshot: bool,
}

impl PageSpeedClient {
    /// Creates a client from API settings; the key is taken from the config, never from code
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pulse/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.key.clone().filter(|k| !k.trim().is_empty()),
            strategy: config.strategy,
            screenshot: config.screenshot,
        })
    }

    /// Query parameters for one analysis request, in wire order
    pub fn query_params(&self, target: &Url) -> Vec<(&'static str, String)> {
        let mut params = vec![("url", target.to_string())];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }
        params.push(("strategy", self.strategy.as_str().to_string()));
        for category in Category::ALL {
            params.push(("category", category.api_selector().to_string()));
        }
        if self.screenshot {
            params.push(("screenshot", "true".to_string()));
        }
        params
    }

    async fn run(&self, target: &Url) -> Result<AnalysisResult> {
        debug!(
            "Requesting {} analysis for {} (key configured: {})",
            self.strategy.as_str(),
            target,
            self.api_key.is_some()
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query_params(target))
            .send()
            .await
            .map_err(|e| {
                warn!("Analysis request for {} failed: {}", target, e);
                Error::transport_generic(None)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("Failed to read analysis response for {}: {}", target, e);
            Error::transport_generic(Some(status.as_u16()))
        })?;

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        let result = decode_envelope(&body)?;
        info!("Analyzed {} ({} audits)", target, result.lighthouse_result.audits.len());
        Ok(result)
    }
}

#[async_trait]
impl AnalysisProvider for PageSpeedClient {
    async fn analyze(&self, target: &Url) -> Result<AnalysisResult> {
        self.run(target).await
    }
}

/// Map a non-success response to a transport error, preferring the provider's own message
fn error_from_body(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.pointer("/error/message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(ToString::to_string)
    });

    warn!(
        "Analysis provider returned {}: {}",
        status,
        message.as_deref().unwrap_or("<no message>")
    );

    match message {
        Some(message) => Error::Transport {
            status: Some(status.as_u16()),
            message,
        },
        None => Error::transport_generic(Some(status.as_u16())),
    }
}

/// Just enough of the envelope to tell a missing section from a malformed one
#[derive(Deserialize)]
struct EnvelopeShape {
    #[serde(rename = "lighthouseResult", default)]
    lighthouse_result: Option<IgnoredAny>,
}

/// Decode a success body, requiring the `lighthouseResult` envelope
///
/// The body is decoded straight into [`AnalysisResult`] so audit maps keep
/// the provider's key order.
fn decode_envelope(body: &str) -> Result<AnalysisResult> {
    let shape: EnvelopeShape = serde_json::from_str(body)
        .map_err(|e| Error::Contract(format!("response is not JSON: {e}")))?;

    if shape.lighthouse_result.is_none() {
        return Err(Error::Contract("missing lighthouseResult".to_string()));
    }

    serde_json::from_str(body)
        .map_err(|e| Error::Contract(format!("malformed lighthouseResult: {e}")))
}
