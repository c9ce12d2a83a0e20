use indexmap::IndexMap;
use pulse_core::assessment::Assessment;
use pulse_core::export::MetricRow;
use pulse_core::suggestions::{PositiveFeedback, Suggestion};
use pulse_core::{Analysis, Category, LoadingExperience, ResultSource, to_percent};
use serde::Serialize;

/// Machine-readable analysis report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport<'a> {
    pub url: &'a str,
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_time: Option<&'a str>,
    /// 0–100 per category key; null when the provider returned no score.
    pub scores: IndexMap<&'static str, Option<u8>>,
    pub suggestions: Vec<Suggestion>,
    pub positive_feedback: Vec<PositiveFeedback>,
    pub assessment: Assessment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<MetricRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_data: Option<&'a LoadingExperience>,
}

impl<'a> JsonReport<'a> {
    pub fn new(analysis: &'a Analysis, details: bool) -> Self {
        let result = &analysis.result;
        let scores = Category::ALL
            .into_iter()
            .map(|c| (c.key(), result.category_score(c).map(to_percent)))
            .collect();

        Self {
            url: &analysis.url,
            source: match analysis.source {
                ResultSource::Cache => "cache",
                ResultSource::Network => "network",
            },
            fetch_time: result.lighthouse_result.fetch_time.as_deref(),
            scores,
            suggestions: analysis.suggestions(),
            positive_feedback: analysis.positive_feedback(),
            assessment: analysis.assessment(),
            metrics: details.then(|| analysis.table()),
            field_data: if details {
                result.loading_experience.as_ref()
            } else {
                None
            },
        }
    }
}
