//! Data model for PageSpeed Insights responses.
//!
//! Only the parts of the envelope pulse reads are modelled; unknown fields are
//! dropped on decode. Audit maps keep the provider's insertion order because the
//! exported metric table follows it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four Lighthouse categories pulse requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Loading speed and responsiveness.
    Performance,
    /// Accessibility for assistive technology users.
    Accessibility,
    /// General web platform best practices.
    BestPractices,
    /// Search engine optimization.
    Seo,
}

impl Category {
    /// All categories in the fixed reporting order.
    pub const ALL: [Self; 4] = [
        Self::Performance,
        Self::Accessibility,
        Self::BestPractices,
        Self::Seo,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Performance => "Performance",
            Self::Accessibility => "Accessibility",
            Self::BestPractices => "Best Practices",
            Self::Seo => "SEO",
        }
    }

    /// Key used for the category inside `lighthouseResult.categories`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Accessibility => "accessibility",
            Self::BestPractices => "best-practices",
            Self::Seo => "seo",
        }
    }

    /// Value of the repeated `category` query parameter.
    #[must_use]
    pub const fn api_selector(self) -> &'static str {
        match self {
            Self::Performance => "PERFORMANCE",
            Self::Accessibility => "ACCESSIBILITY",
            Self::BestPractices => "BEST_PRACTICES",
            Self::Seo => "SEO",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Device profile Lighthouse emulates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Emulated mid-tier phone on a throttled connection.
    #[default]
    Mobile,
    /// Desktop profile.
    Desktop,
}

impl Strategy {
    /// Value of the `strategy` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Desktop => "desktop",
        }
    }
}

/// A full analysis as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Final URL the provider analyzed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Lab data from the Lighthouse run.
    pub lighthouse_result: LighthouseResult,
    /// Field data for the exact URL, when the provider has any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_experience: Option<LoadingExperience>,
    /// Field data aggregated over the whole origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_loading_experience: Option<LoadingExperience>,
    /// When the provider produced this analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_utc_timestamp: Option<String>,
}

/// The `lighthouseResult` section of the envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseResult {
    /// URL as submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_url: Option<String>,
    /// URL after redirects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    /// ISO-8601 time the page was loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_time: Option<String>,
    /// Lighthouse release that produced the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighthouse_version: Option<String>,
    /// Category scores.
    #[serde(default)]
    pub categories: Categories,
    /// Audits keyed by identifier, in provider order.
    #[serde(default)]
    pub audits: IndexMap<String, Audit>,
    /// Present only when a screenshot was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_page_screenshot: Option<FullPageScreenshot>,
}

/// Per-category scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Categories {
    /// `performance`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<CategoryScore>,
    /// `accessibility`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<CategoryScore>,
    /// `best-practices`
    #[serde(
        default,
        rename = "best-practices",
        skip_serializing_if = "Option::is_none"
    )]
    pub best_practices: Option<CategoryScore>,
    /// `seo`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<CategoryScore>,
}

impl Categories {
    /// The record for `category`, if the provider returned one.
    #[must_use]
    pub const fn get(&self, category: Category) -> Option<&CategoryScore> {
        match category {
            Category::Performance => self.performance.as_ref(),
            Category::Accessibility => self.accessibility.as_ref(),
            Category::BestPractices => self.best_practices.as_ref(),
            Category::Seo => self.seo.as_ref(),
        }
    }
}

/// Score record for a single category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Score in [0, 1]; null when Lighthouse could not compute it.
    #[serde(default)]
    pub score: Option<f64>,
}

/// A single Lighthouse audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    /// Short human-readable name.
    #[serde(default)]
    pub title: String,
    /// Markdown explanation, usually with a docs link.
    #[serde(default)]
    pub description: String,
    /// Score in [0, 1]; null for informative or not-applicable audits.
    #[serde(default)]
    pub score: Option<f64>,
    /// Measured value as Lighthouse formats it, e.g. `1.2 s`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
    /// `binary`, `numeric`, `informative`, and so on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_display_mode: Option<String>,
}

/// Full-page screenshot attached when the request asks for one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullPageScreenshot {
    /// The captured image.
    pub screenshot: Screenshot,
}

/// Encoded screenshot image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screenshot {
    /// Base64 payload, possibly wrapped in a `data:` URI.
    pub data: String,
    /// Pixel width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Pixel height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Chrome UX Report field data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadingExperience {
    /// `FAST`, `AVERAGE` or `SLOW`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_category: Option<String>,
    /// Metrics keyed by name, in provider order.
    #[serde(default)]
    pub metrics: IndexMap<String, FieldMetric>,
}

/// One field metric such as `LARGEST_CONTENTFUL_PAINT_MS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetric {
    /// 75th percentile value.
    pub percentile: f64,
    /// Bucket the percentile falls in.
    pub category: String,
}

impl AnalysisResult {
    /// Score of `category` in [0, 1], if present and non-null.
    #[must_use]
    pub fn category_score(&self, category: Category) -> Option<f64> {
        self.lighthouse_result
            .categories
            .get(category)
            .and_then(|c| c.score)
    }

    /// Look up an audit by identifier.
    #[must_use]
    pub fn audit(&self, id: &str) -> Option<&Audit> {
        self.lighthouse_result.audits.get(id)
    }

    /// Best available description of what was analyzed.
    #[must_use]
    pub fn analyzed_url(&self) -> Option<&str> {
        self.lighthouse_result
            .final_url
            .as_deref()
            .or(self.id.as_deref())
            .or(self.lighthouse_result.requested_url.as_deref())
    }

    /// Raw base64 of the full-page screenshot with any `data:` prefix removed.
    #[must_use]
    pub fn screenshot_base64(&self) -> Option<&str> {
        let data = &self
            .lighthouse_result
            .full_page_screenshot
            .as_ref()?
            .screenshot
            .data;
        Some(data.split_once(";base64,").map_or(data.as_str(), |(_, b64)| b64))
    }
}

/// Traffic-light bucket for a 0–100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRating {
    /// 90 and above.
    Good,
    /// 50 to 89.
    NeedsImprovement,
    /// Below 50.
    Poor,
}

impl ScoreRating {
    /// Rate a fractional score in [0, 1].
    #[must_use]
    pub fn from_fraction(score: f64) -> Self {
        match to_percent(score) {
            90.. => Self::Good,
            50..=89 => Self::NeedsImprovement,
            _ => Self::Poor,
        }
    }
}

/// Convert a fractional score to a rounded, clamped 0–100 integer.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_percent(score: f64) -> u8 {
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ENVELOPE: &str = r#"{
        "id": "https://example.com/",
        "loadingExperience": {
            "overall_category": "FAST",
            "metrics": {
                "LARGEST_CONTENTFUL_PAINT_MS": {"percentile": 1800, "category": "FAST"}
            }
        },
        "lighthouseResult": {
            "requestedUrl": "https://example.com",
            "finalUrl": "https://example.com/",
            "categories": {
                "performance": {"title": "Performance", "score": 0.95},
                "accessibility": {"title": "Accessibility", "score": 0.85},
                "best-practices": {"title": "Best Practices", "score": null},
                "seo": {"title": "SEO", "score": 1}
            },
            "audits": {
                "speed-index": {"title": "Speed Index", "description": "d1", "score": 0.7},
                "bf-cache": {"title": "Back/forward cache", "description": "d2", "score": null},
                "document-title": {"title": "Document has a title", "description": "d3", "score": 1}
            },
            "fullPageScreenshot": {
                "screenshot": {"data": "data:image/webp;base64,QUJD", "width": 10, "height": 20}
            },
            "environment": {"ignored": true}
        }
    }"#;

    #[test]
    fn test_decode_envelope() {
        let result: AnalysisResult = serde_json::from_str(ENVELOPE).unwrap();

        assert_eq!(result.category_score(Category::Performance), Some(0.95));
        assert_eq!(result.category_score(Category::Seo), Some(1.0));
        assert_eq!(result.category_score(Category::BestPractices), None);
        assert_eq!(result.analyzed_url(), Some("https://example.com/"));

        let keys: Vec<&str> = result
            .lighthouse_result
            .audits
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["speed-index", "bf-cache", "document-title"]);
        assert_eq!(result.audit("bf-cache").unwrap().score, None);

        let field = result.loading_experience.as_ref().unwrap();
        assert_eq!(field.overall_category.as_deref(), Some("FAST"));
    }

    #[test]
    fn test_screenshot_strips_data_uri() {
        let result: AnalysisResult = serde_json::from_str(ENVELOPE).unwrap();
        assert_eq!(result.screenshot_base64(), Some("QUJD"));
    }

    #[test]
    fn test_reencode_preserves_audit_order() {
        let result: AnalysisResult = serde_json::from_str(ENVELOPE).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }

    #[test]
    fn test_category_labels_and_keys() {
        let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            ["Performance", "Accessibility", "Best Practices", "SEO"]
        );
        assert_eq!(Category::BestPractices.key(), "best-practices");
        assert_eq!(Category::BestPractices.api_selector(), "BEST_PRACTICES");
        assert_eq!(
            serde_json::to_string(&Category::BestPractices).unwrap(),
            "\"best-practices\""
        );
    }

    #[test]
    fn test_score_rating_thresholds() {
        assert_eq!(ScoreRating::from_fraction(0.9), ScoreRating::Good);
        assert_eq!(ScoreRating::from_fraction(0.89), ScoreRating::NeedsImprovement);
        assert_eq!(ScoreRating::from_fraction(0.5), ScoreRating::NeedsImprovement);
        assert_eq!(ScoreRating::from_fraction(0.49), ScoreRating::Poor);
    }

    #[test]
    fn test_to_percent_rounds_and_clamps() {
        assert_eq!(to_percent(0.0), 0);
        assert_eq!(to_percent(0.456), 46);
        assert_eq!(to_percent(1.0), 100);
        assert_eq!(to_percent(1.7), 100);
        assert_eq!(to_percent(-0.2), 0);
    }
}
