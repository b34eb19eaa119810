//! Exporting stored reports as standalone artifacts

mod html;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use super::{check_report_id, ReportStorage, StorageError};
use crate::fs::write_with_backup;
use crate::models::analytics::HistoricalTrend;
use crate::models::stored::StoredReport;

pub use html::render_html;

/// Days of history included with `include_history`
pub const EXPORT_TREND_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Html,
    /// Rendered as HTML next to the requested path
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Parse a user-supplied format name, falling back to JSON for unknown names
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            warn!(format = s, "Unknown export format, using json");
            ExportFormat::Json
        })
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "html" => Ok(ExportFormat::Html),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => anyhow::bail!("Invalid export format: {s}. Use: json, html, pdf"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Attach the last 30 days of trends
    pub include_history: bool,
    /// Draw trend sparklines in HTML output
    pub include_charts: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    #[serde(flatten)]
    report: &'a StoredReport,
    historical_trends: &'a [HistoricalTrend],
}

impl ReportStorage {
    /// Write report `id` in the requested format and return the path written.
    ///
    /// PDF output is an HTML file next to the requested `.pdf` path.
    pub fn export_report(
        &self,
        id: &str,
        options: &ExportOptions,
        output: Option<&Path>,
    ) -> Result<PathBuf> {
        check_report_id(id)?;
        let stored = self
            .get_report(id)
            .ok_or_else(|| StorageError::ReportNotFound(id.to_string()))?;

        let requested = match output {
            Some(path) => path.to_path_buf(),
            None => self.default_export_path(&stored, options.format),
        };

        let trends = if options.include_history
            || (options.include_charts && options.format != ExportFormat::Json)
        {
            self.generate_trend_analysis(EXPORT_TREND_DAYS)
        } else {
            Vec::new()
        };

        let (path, content) = match options.format {
            ExportFormat::Json => {
                let serialized = if options.include_history {
                    serde_json::to_string_pretty(&JsonExport {
                        report: &stored,
                        historical_trends: &trends,
                    })
                } else {
                    serde_json::to_string_pretty(&stored)
                };
                let content = serialized.context("Failed to serialize report")?;
                (requested, content)
            }
            ExportFormat::Html => (requested, render_html(&stored, options, &trends)),
            ExportFormat::Pdf => (
                requested.with_extension("html"),
                render_html(&stored, options, &trends),
            ),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        write_with_backup(&path, &content)?;

        info!(id, format = %options.format, path = %path.display(), "Exported report");
        if options.format == ExportFormat::Pdf {
            let pdf = requested_pdf_path(&path);
            info!(
                html = %path.display(),
                "PDF rendering is not built in; convert with: chromium --headless --print-to-pdf={} {}",
                pdf.display(),
                path.display()
            );
        }

        Ok(path)
    }

    /// `{exports}/report-{id}-{timestamp}.{ext}` with `:` and `.` made path-safe
    pub fn default_export_path(&self, stored: &StoredReport, format: ExportFormat) -> PathBuf {
        let stamp = stored
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
            .replace([':', '.'], "-");
        self.exports_dir()
            .join(format!("report-{}-{stamp}.{}", stored.id, format.extension()))
    }
}

fn requested_pdf_path(html: &Path) -> PathBuf {
    html.with_extension("pdf")
}
