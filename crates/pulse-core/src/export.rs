//! Tabular export of audit metrics.
//!
//! [`to_table`] projects an analysis into `Metric / Score / Description` rows;
//! [`to_xlsx`] and [`to_csv`] encode those rows. Everything here is pure given
//! the rows and the export date, so the same inputs always yield the same bytes.

use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook};
use serde::{Deserialize, Serialize};

use crate::types::to_percent;
use crate::{AnalysisResult, Error, Result};

/// Column headers shared by both encodings.
pub const HEADERS: [&str; 3] = ["Metric", "Score", "Description"];

const SHEET_NAME: &str = "Metrics";
const FILE_STEM: &str = "pagespeed-report";

/// One exported audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    /// Audit title.
    #[serde(rename = "Metric")]
    pub metric: String,
    /// Rounded 0–100 score.
    #[serde(rename = "Score")]
    pub score: u8,
    /// Audit description.
    #[serde(rename = "Description")]
    pub description: String,
}

/// Output encoding for [`export_file_name`] and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Office Open XML workbook.
    Xlsx,
    /// Comma-separated values.
    Csv,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

/// Audits with a score, in provider order.
#[must_use]
pub fn to_table(result: &AnalysisResult) -> Vec<MetricRow> {
    result
        .lighthouse_result
        .audits
        .values()
        .filter_map(|audit| {
            audit.score.map(|score| MetricRow {
                metric: audit.title.clone(),
                score: to_percent(score),
                description: audit.description.clone(),
            })
        })
        .collect()
}

/// `pagespeed-report-YYYY-MM-DD.<ext>`.
#[must_use]
pub fn export_file_name(format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{FILE_STEM}-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Encode rows with the chosen format.
pub fn encode(format: ExportFormat, rows: &[MetricRow], date: NaiveDate) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Xlsx => to_xlsx(rows, date),
        ExportFormat::Csv => to_csv(rows),
    }
}

/// Single-sheet workbook: header row, then one row per metric.
///
/// The document creation date is pinned to `date` so output does not depend on
/// the time of day.
pub fn to_xlsx(rows: &[MetricRow], date: NaiveDate) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let year = u16::try_from(date.year())
        .map_err(|_| Error::Export(format!("Year {} out of range", date.year())))?;
    #[allow(clippy::cast_possible_truncation)]
    let created = ExcelDateTime::from_ymd(year, date.month() as u8, date.day() as u8)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, header) in (0u16..).zip(HEADERS) {
        sheet.write_string_with_format(0, col, header, &bold)?;
    }

    for (row_idx, row) in (1u32..).zip(rows) {
        sheet.write_string(row_idx, 0, row.metric.as_str())?;
        sheet.write_number(row_idx, 1, f64::from(row.score))?;
        sheet.write_string(row_idx, 2, row.description.as_str())?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// RFC 4180 CSV with a header row.
pub fn to_csv(rows: &[MetricRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        writer.write_record(HEADERS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| Error::Export(format!("Failed to flush CSV: {e}")))
}
