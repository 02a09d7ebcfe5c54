//! Validation reports and their renderers
//!
//! `ValidationReport` holds the results of one run; a `Reporter` renders it
//! as console text, JSON or HTML. Rendering never mutates the report. Writing
//! to a file is plain `fs::write`, with no locking or atomic rename.

pub mod console;
pub mod html;
pub mod json;
pub mod model;

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DevsetupError, Result};

pub use console::ConsoleReporter;
pub use html::HtmlReporter;
pub use json::JsonReporter;
pub use model::{ReportEntry, ReportSummary, ValidationReport};

/// Output format of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Console,
    Json,
    Html,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Console => "console",
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = DevsetupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "console" | "text" => Ok(ReportFormat::Console),
            "json" => Ok(ReportFormat::Json),
            "html" => Ok(ReportFormat::Html),
            other => Err(DevsetupError::Report(format!("Unknown report format: {}", other))),
        }
    }
}

/// Renders a `ValidationReport`
pub trait Reporter: Send + Sync {
    /// Render the report to a string
    fn format_report(&self, report: &ValidationReport) -> Result<String>;

    /// Build a report from results
    fn generate_report(&self, results: Vec<ReportEntry>, metadata: BTreeMap<String, Value>) -> ValidationReport {
        ValidationReport::new(results, metadata)
    }

    /// Render the report into a writer
    fn write_report(&self, report: &ValidationReport, out: &mut dyn Write) -> Result<()> {
        let rendered = self.format_report(report)?;
        out.write_all(rendered.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Render the report into a file, replacing its contents
    fn write_to_file(&self, report: &ValidationReport, path: &Path) -> Result<()> {
        let rendered = self.format_report(report)?;
        std::fs::write(path, rendered)
            .map_err(|e| DevsetupError::Report(format!("Failed to write {}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), "Wrote validation report");
        Ok(())
    }
}

/// Pick a reporter for a format
pub fn reporter_for(format: ReportFormat, verbose: bool, color: bool) -> Box<dyn Reporter> {
    match format {
        ReportFormat::Console => Box::new(ConsoleReporter::new().verbose(verbose).color(color)),
        ReportFormat::Json => Box::new(JsonReporter::new()),
        ReportFormat::Html => Box::new(HtmlReporter::new()),
    }
}
