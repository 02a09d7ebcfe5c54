//! Human-readable terminal report

use std::fmt::Write as _;

use colored::{Color, Colorize};

use super::Reporter;
use super::model::{ReportEntry, ValidationReport};
use crate::error::Result;
use crate::validation::ValidationStatus;

/// Text summary with optional per-result detail.
///
/// Without `verbose`, only failed validators are listed after the summary.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    verbose: bool,
    color: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            verbose: false,
            color: true,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn status_color(status: ValidationStatus) -> Color {
        match status {
            ValidationStatus::Valid => Color::Green,
            ValidationStatus::Warning => Color::Yellow,
            ValidationStatus::Error => Color::Red,
            ValidationStatus::Unknown => Color::BrightBlack,
        }
    }

    fn write_entry(&self, out: &mut String, entry: &ReportEntry) {
        let result = &entry.result;
        let marker = if result.is_valid() { "✓" } else { "✗" };
        let _ = writeln!(
            out,
            "{} {}: {}",
            self.paint(marker, Self::status_color(result.status())),
            self.bold(&entry.validator),
            result.message()
        );
        for error in result.errors() {
            let _ = writeln!(out, "    {} {}", self.paint("error:", Color::Red), error);
        }
        for warning in result.warnings() {
            let _ = writeln!(out, "    {} {}", self.paint("warning:", Color::Yellow), warning);
        }
        for recommendation in result.recommendations() {
            let _ = writeln!(out, "    {} {}", self.paint("hint:", Color::Cyan), recommendation);
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn format_report(&self, report: &ValidationReport) -> Result<String> {
        let summary = report.summary();
        let mut out = String::new();

        let _ = writeln!(out, "{}", self.bold("Validation Report"));
        let _ = writeln!(out, "{}", "=".repeat(40));
        let _ = writeln!(out, "Generated:    {}", report.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
        let _ = writeln!(out, "Validations:  {}", summary.total_validations);
        let _ = writeln!(
            out,
            "Passed:       {}",
            self.paint(&summary.valid_count.to_string(), Color::Green)
        );
        let _ = writeln!(
            out,
            "Failed:       {}",
            self.paint(&summary.invalid_count.to_string(), Color::Red)
        );
        let _ = writeln!(out, "Errors:       {}", summary.total_errors);
        let _ = writeln!(out, "Warnings:     {}", summary.total_warnings);
        let _ = writeln!(out, "Success rate: {:.1}%", summary.success_rate);
        let status = summary.overall_status.as_str().to_uppercase();
        let _ = writeln!(
            out,
            "Status:       {}",
            self.paint(&status, Self::status_color(summary.overall_status))
        );

        if self.verbose {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", self.bold("Results"));
            for entry in &report.results {
                self.write_entry(&mut out, entry);
            }
        } else if summary.invalid_count > 0 {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", self.bold("Failed validations"));
            for entry in report.failed() {
                self.write_entry(&mut out, entry);
            }
        }

        Ok(out)
    }
}
