//! Improvement suggestions and positive feedback derived from category scores.
//!
//! Both functions are pure: they read an [`AnalysisResult`] and produce owned
//! lists, so callers recompute them whenever they need them.

use serde::{Deserialize, Serialize};

use crate::{AnalysisResult, Category};

/// Category scores below this are flagged for improvement.
pub const GOOD_SCORE: f64 = 0.9;

/// Performance audits below this are listed.
const PERFORMANCE_AUDIT_THRESHOLD: f64 = 0.9;

/// Audits in the other categories must pass outright.
const BINARY_AUDIT_THRESHOLD: f64 = 1.0;

/// A category that needs work, with the checks that failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Category the checks belong to.
    pub category: Category,
    /// Category score in [0, 1].
    pub score: f64,
    /// Labels in fixed check order.
    pub items: Vec<String>,
}

/// A category that scored well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositiveFeedback {
    /// Category being praised.
    pub category: Category,
    /// Category score in [0, 1].
    pub score: f64,
    /// Fixed message for the category.
    pub message: String,
}

struct Check {
    audit: &'static str,
    label: &'static str,
}

const PERFORMANCE_CHECKS: &[Check] = &[
    Check {
        audit: "first-contentful-paint",
        label: "Optimize First Contentful Paint",
    },
    Check {
        audit: "largest-contentful-paint",
        label: "Improve Largest Contentful Paint",
    },
    Check {
        audit: "total-blocking-time",
        label: "Reduce Total Blocking Time",
    },
    Check {
        audit: "cumulative-layout-shift",
        label: "Minimize Cumulative Layout Shift",
    },
];

const ACCESSIBILITY_CHECKS: &[Check] = &[
    Check {
        audit: "color-contrast",
        label: "Improve color contrast",
    },
    Check {
        audit: "document-title",
        label: "Add proper document title",
    },
    Check {
        audit: "html-has-lang",
        label: "Add language attribute to HTML",
    },
    Check {
        audit: "image-alt",
        label: "Add alt text to images",
    },
];

const BEST_PRACTICES_CHECKS: &[Check] = &[
    Check {
        audit: "no-document-write",
        label: "Avoid document.write()",
    },
    Check {
        audit: "js-libraries",
        label: "Update JavaScript libraries",
    },
    Check {
        audit: "deprecations",
        label: "Remove deprecated APIs",
    },
    Check {
        audit: "errors-in-console",
        label: "Fix console errors",
    },
];

const SEO_CHECKS: &[Check] = &[
    Check {
        audit: "meta-description",
        label: "Add meta description",
    },
    Check {
        audit: "link-text",
        label: "Use descriptive link text",
    },
    Check {
        audit: "robots-txt",
        label: "Add robots.txt file",
    },
    Check {
        audit: "tap-targets",
        label: "Size tap targets appropriately",
    },
];

const fn checks_for(category: Category) -> (&'static [Check], f64) {
    match category {
        Category::Performance => (PERFORMANCE_CHECKS, PERFORMANCE_AUDIT_THRESHOLD),
        Category::Accessibility => (ACCESSIBILITY_CHECKS, BINARY_AUDIT_THRESHOLD),
        Category::BestPractices => (BEST_PRACTICES_CHECKS, BINARY_AUDIT_THRESHOLD),
        Category::Seo => (SEO_CHECKS, BINARY_AUDIT_THRESHOLD),
    }
}

/// Categories scoring below [`GOOD_SCORE`], each with its failing checks.
///
/// A check is listed when its audit is present and the audit score is null or
/// below the category's audit threshold. Audits missing from the result are
/// never listed.
#[must_use]
pub fn derive_suggestions(result: &AnalysisResult) -> Vec<Suggestion> {
    Category::ALL
        .into_iter()
        .filter_map(|category| {
            let score = result.category_score(category)?;
            if score >= GOOD_SCORE {
                return None;
            }

            let (checks, threshold) = checks_for(category);
            let items = checks
                .iter()
                .filter(|check| {
                    result
                        .audit(check.audit)
                        .is_some_and(|audit| audit.score.is_none_or(|s| s < threshold))
                })
                .map(|check| check.label.to_string())
                .collect();

            Some(Suggestion {
                category,
                score,
                items,
            })
        })
        .collect()
}

/// One congratulatory message per category scoring at least [`GOOD_SCORE`].
#[must_use]
pub fn derive_positive_feedback(result: &AnalysisResult) -> Vec<PositiveFeedback> {
    Category::ALL
        .into_iter()
        .filter_map(|category| {
            let score = result.category_score(category)?;
            (score >= GOOD_SCORE).then(|| PositiveFeedback {
                category,
                score,
                message: praise(category).to_string(),
            })
        })
        .collect()
}

const fn praise(category: Category) -> &'static str {
    match category {
        Category::Performance => {
            "Excellent performance! Your page loads quickly and responds smoothly."
        },
        Category::Accessibility => {
            "Excellent accessibility! Your page works well for people using assistive technology."
        },
        Category::BestPractices => {
            "Excellent best practices! Your page follows modern web platform standards."
        },
        Category::Seo => "Excellent SEO! Your page is well prepared for search engines.",
    }
}
