//! Console and file reporter

use crate::core::styles::StyleRole;
use crate::reporter::{ReportError, Reporter, ScanReport};
use async_trait::async_trait;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

/// Output layout
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportFormat {
    /// Aligned edge/weight table
    #[default]
    Text,
    /// Pretty-printed JSON document per scan
    Json,
}

/// Writes every report to stdout, or appends it to a file
pub struct ConsoleReporter {
    format: ReportFormat,
    destination: Option<PathBuf>,
    use_colors: bool,
}

impl ConsoleReporter {
    pub fn new(format: ReportFormat, destination: Option<PathBuf>, use_colors: bool) -> Self {
        // Never write escape codes into a file
        let use_colors = use_colors && destination.is_none();
        Self {
            format,
            destination,
            use_colors,
        }
    }

    pub fn stdout(format: ReportFormat) -> Self {
        Self::new(format, None, false)
    }

    pub fn render(&self, report: &ScanReport) -> Result<String, ReportError> {
        match self.format {
            ReportFormat::Text => Ok(self.render_text(report)),
            ReportFormat::Json => {
                let mut json = serde_json::to_string_pretty(report)?;
                json.push('\n');
                Ok(json)
            }
        }
    }

    fn render_text(&self, report: &ScanReport) -> String {
        let paint = |role: StyleRole, text: &str| role.paint(text, self.use_colors);
        let mut out = String::new();

        out.push_str(&paint(
            StyleRole::Header,
            &format!(
                "Import weights for {} (job #{}, {})",
                report.job.folder, report.job.sequence, report.job.url
            ),
        ));
        out.push('\n');

        if report.weights.is_empty() {
            out.push_str(&paint(StyleRole::Dim, "No imports found"));
            out.push('\n');
        } else {
            let rows = report.weights.heaviest();
            let edge_width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0).max(4);
            let weight_width = rows
                .iter()
                .map(|(_, w)| w.to_string().len())
                .max()
                .unwrap_or(0)
                .max(6);

            let separator = format!(
                "+{}+{}+\n",
                "-".repeat(edge_width + 2),
                "-".repeat(weight_width + 2)
            );
            out.push_str(&separator);
            out.push_str(&format!(
                "| {} | {} |\n",
                paint(StyleRole::Header, &format!("{:<edge_width$}", "EDGE")),
                paint(StyleRole::Header, &format!("{:>weight_width$}", "WEIGHT")),
            ));
            out.push_str(&separator);
            for (edge, weight) in rows {
                out.push_str(&format!(
                    "| {} | {} |\n",
                    paint(StyleRole::Edge, &format!("{:<edge_width$}", edge)),
                    paint(StyleRole::Weight, &format!("{:>weight_width$}", weight)),
                ));
            }
            out.push_str(&separator);
        }

        out.push_str(&paint(
            StyleRole::Dim,
            &format!(
                "{} edges, {} imports, {} of {} files with an import block, {} ms",
                report.weights.len(),
                report.weights.total(),
                report.packages,
                report.files_scanned,
                report.duration.as_millis()
            ),
        ));
        out.push('\n');
        out
    }

    fn write(&self, rendered: &str) -> io::Result<()> {
        match &self.destination {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(rendered.as_bytes())?;
                file.flush()
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(rendered.as_bytes())?;
                stdout.flush()
            }
        }
    }
}

#[async_trait]
impl Reporter for ConsoleReporter {
    fn name(&self) -> &str {
        "console"
    }

    async fn emit(&self, report: &ScanReport) -> Result<(), ReportError> {
        let rendered = self.render(report)?;
        self.write(&rendered)
            .map_err(|e| ReportError::io(self.destination.as_ref(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::test_support::sample_report;
    use tempfile::TempDir;

    #[test]
    fn test_text_table_lists_heaviest_first() {
        let reporter = ConsoleReporter::stdout(ReportFormat::Text);
        let text = reporter.render(&sample_report()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].contains("dimago"));
        assert!(lines[0].contains("job #3"));
        assert!(lines[2].contains("EDGE") && lines[2].contains("WEIGHT"));
        assert!(lines[4].contains("server:fmt") && lines[4].trim_end().ends_with("2 |"));
        assert!(lines[5].contains("server:net/http"));
        assert!(text.contains("2 edges, 3 imports, 2 of 4 files"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_empty_weights_rendered_as_notice() {
        let mut report = sample_report();
        report.weights = Default::default();

        let text = ConsoleReporter::stdout(ReportFormat::Text)
            .render(&report)
            .unwrap();
        assert!(text.contains("No imports found"));
    }

    #[test]
    fn test_json_document_shape() {
        let json = ConsoleReporter::stdout(ReportFormat::Json)
            .render(&sample_report())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["job"]["folder"], "dimago");
        assert_eq!(value["job"]["sequence"], 3);
        assert_eq!(value["weights"]["server:fmt"], 2);
        assert_eq!(value["files_scanned"], 4);
        assert_eq!(value["duration_ms"], 1500);
    }

    #[tokio::test]
    async fn test_file_destination_appends_without_colors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/weights.txt");
        let reporter = ConsoleReporter::new(ReportFormat::Text, Some(path.clone()), true);

        reporter.emit(&sample_report()).await.unwrap();
        reporter.emit(&sample_report()).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.matches("Import weights for dimago").count(), 2);
        assert!(!written.contains('\x1b'));
    }
}
