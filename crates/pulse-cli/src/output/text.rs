use std::io::Write;

use anyhow::Result;
use colored::{ColoredString, Colorize};
use pulse_core::assessment::Tier;
use pulse_core::{Analysis, Category, ResultSource, ScoreRating, to_percent};

/// Terminal rendering of an analysis.
pub struct TextReport<'a> {
    analysis: &'a Analysis,
    details: bool,
}

impl<'a> TextReport<'a> {
    pub const fn new(analysis: &'a Analysis, details: bool) -> Self {
        Self { analysis, details }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        self.header(out)?;
        self.scores(out)?;
        self.suggestions(out)?;
        self.feedback(out)?;
        self.assessment(out)?;
        if self.details {
            self.metrics(out)?;
            self.field_data(out)?;
        }
        Ok(())
    }

    fn header<W: Write>(&self, out: &mut W) -> Result<()> {
        let origin = match self.analysis.source {
            ResultSource::Cache => " (cached)".dimmed().to_string(),
            ResultSource::Network => String::new(),
        };
        writeln!(
            out,
            "{} {}{}",
            "Analysis for".bold(),
            self.analysis.url.cyan(),
            origin
        )?;
        if let Some(fetched) = &self.analysis.result.lighthouse_result.fetch_time {
            writeln!(out, "{}", format!("Fetched {fetched}").dimmed())?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn scores<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{}", "Scores".bold())?;
        for category in Category::ALL {
            let score = match self.analysis.result.category_score(category) {
                Some(score) => rated(score),
                None => "n/a".dimmed(),
            };
            writeln!(out, "  {:<16} {score:>3}", category.label())?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn suggestions<W: Write>(&self, out: &mut W) -> Result<()> {
        let suggestions = self.analysis.suggestions();
        if suggestions.is_empty() {
            return Ok(());
        }

        writeln!(out, "{}", "Suggested improvements".bold())?;
        for suggestion in &suggestions {
            writeln!(
                out,
                "  {} ({})",
                suggestion.category.label().yellow(),
                to_percent(suggestion.score)
            )?;
            for item in &suggestion.items {
                writeln!(out, "    • {item}")?;
            }
        }
        writeln!(out)?;
        Ok(())
    }

    fn feedback<W: Write>(&self, out: &mut W) -> Result<()> {
        let feedback = self.analysis.positive_feedback();
        if feedback.is_empty() {
            return Ok(());
        }

        writeln!(out, "{}", "What's working".bold())?;
        for item in &feedback {
            writeln!(out, "  {} {}", "✓".green(), item.message)?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn assessment<W: Write>(&self, out: &mut W) -> Result<()> {
        let assessment = self.analysis.assessment();
        if assessment.categories.is_empty() {
            return Ok(());
        }

        writeln!(out, "{}", "Assessment".bold())?;
        for category in &assessment.categories {
            let marker = match category.tier {
                Tier::Excellent => "●".green(),
                Tier::Good => "●".yellow(),
                Tier::NeedsAttention => "●".red(),
            };
            writeln!(out, "  {marker} {}", category.headline)?;
            for action in &category.actions {
                writeln!(out, "      - {action}")?;
            }
        }
        if let Some(overall) = &assessment.overall {
            writeln!(out)?;
            writeln!(out, "  {overall}")?;
        }
        Ok(())
    }

    fn metrics<W: Write>(&self, out: &mut W) -> Result<()> {
        let scored: Vec<_> = self
            .analysis
            .result
            .lighthouse_result
            .audits
            .iter()
            .filter_map(|(id, audit)| audit.score.map(|score| (id, audit, score)))
            .collect();

        writeln!(out)?;
        writeln!(out, "{} ({})", "Audits".bold(), scored.len())?;
        for (id, audit, score) in scored {
            let shown = audit
                .display_value
                .as_deref()
                .map_or_else(String::new, |v| format!(" ({v})"));
            writeln!(out, "  {:>3}  {}{shown}", rated(score), audit.title)?;
            writeln!(out, "       {}", learn_more_url(id).dimmed())?;
        }
        Ok(())
    }

    fn field_data<W: Write>(&self, out: &mut W) -> Result<()> {
        let Some(field) = &self.analysis.result.loading_experience else {
            return Ok(());
        };
        if field.metrics.is_empty() {
            return Ok(());
        }

        writeln!(out)?;
        match &field.overall_category {
            Some(overall) => writeln!(out, "{} ({overall})", "Field data".bold())?,
            None => writeln!(out, "{}", "Field data".bold())?,
        }
        for (name, metric) in &field.metrics {
            writeln!(
                out,
                "  {name:<40} {:>8}  {}",
                metric.percentile,
                metric.category.dimmed()
            )?;
        }
        Ok(())
    }
}

fn learn_more_url(audit_id: &str) -> String {
    format!("https://web.dev/lighthouse-{audit_id}/")
}

/// Score as 0–100, colored by rating.
fn rated(score: f64) -> ColoredString {
    let text = to_percent(score).to_string();
    match ScoreRating::from_fraction(score) {
        ScoreRating::Good => text.green(),
        ScoreRating::NeedsImprovement => text.yellow(),
        ScoreRating::Poor => text.red(),
    }
}
