//! Narrative assessment of an analysis: a tier and short action list per
//! category, plus an overall verdict from the mean category score.

use serde::{Deserialize, Serialize};

use crate::{AnalysisResult, Category};

/// Quality tier on the 0–100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// 90 and above.
    Excellent,
    /// 70 to 89.
    Good,
    /// Below 70.
    NeedsAttention,
}

impl Tier {
    /// Bucket a 0–100 score.
    #[must_use]
    pub fn from_percent(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 70.0 {
            Self::Good
        } else {
            Self::NeedsAttention
        }
    }
}

/// Assessment of a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAssessment {
    /// Category assessed.
    pub category: Category,
    /// Tier of its 0–100 score.
    pub tier: Tier,
    /// One-sentence verdict.
    pub headline: String,
    /// Recommended next steps.
    pub actions: Vec<String>,
}

/// Assessment of a whole analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Per-category assessments in reporting order.
    pub categories: Vec<CategoryAssessment>,
    /// Mean of the present category scores, 0–100.
    pub average: Option<f64>,
    /// Verdict on the average, absent when no category scored.
    pub overall: Option<String>,
}

/// Build the assessment. Categories without a score are left out and do not
/// count toward the average.
#[must_use]
pub fn assess(result: &AnalysisResult) -> Assessment {
    let scored: Vec<(Category, f64)> = Category::ALL
        .into_iter()
        .filter_map(|c| result.category_score(c).map(|s| (c, s * 100.0)))
        .collect();

    let categories = scored
        .iter()
        .map(|&(category, score)| assess_category(category, score))
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let average = (!scored.is_empty())
        .then(|| scored.iter().map(|(_, s)| s).sum::<f64>() / scored.len() as f64);

    Assessment {
        categories,
        average,
        overall: average.map(|avg| overall_verdict(Tier::from_percent(avg)).to_string()),
    }
}

fn assess_category(category: Category, score: f64) -> CategoryAssessment {
    let name = category.label();
    let lower = name.to_lowercase();
    let tier = Tier::from_percent(score);

    let (headline, actions) = match tier {
        Tier::Excellent => (
            format!(
                "Excellent {name} score! Your website demonstrates strong {lower} practices."
            ),
            vec![
                format!("Regularly monitor {lower} metrics"),
                "Keep dependencies updated".to_string(),
                "Continue following web standards and best practices".to_string(),
            ],
        ),
        Tier::Good => (
            format!("Good {name} score, but there's room for improvement."),
            vec![
                format!("Review {lower} guidelines"),
                "Implement recommended optimizations".to_string(),
                "Test and monitor regularly".to_string(),
            ],
        ),
        Tier::NeedsAttention => (
            format!("Your {name} score needs attention."),
            vec![
                format!("Address critical {lower} issues"),
                format!("Follow {lower} best practices"),
                format!("Consider a professional {lower} audit"),
            ],
        ),
    };

    CategoryAssessment {
        category,
        tier,
        headline,
        actions,
    }
}

const fn overall_verdict(tier: Tier) -> &'static str {
    match tier {
        Tier::Excellent => {
            "Outstanding results across all categories. Keep monitoring to maintain this quality."
        },
        Tier::Good => {
            "Good overall results with some room to grow. Focus on categories scoring below 90."
        },
        Tier::NeedsAttention => {
            "Several categories need significant work. Start with the lowest-scoring areas and the suggested fixes."
        },
    }
}
