//! Report data model
//!
//! A `ValidationReport` is a snapshot of one run. Every derived figure
//! (counts, success rate, overall status) is computed from `results` on demand.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::validation::{ValidationResult, ValidationStatus};

/// One validator's result inside a report
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    /// Name of the validator that produced the result
    pub validator: String,
    #[serde(flatten)]
    pub result: Arc<ValidationResult>,
}

impl ReportEntry {
    pub fn new(validator: impl Into<String>, result: Arc<ValidationResult>) -> Self {
        Self {
            validator: validator.into(),
            result,
        }
    }
}

/// Headline figures of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_validations: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub warning_count: usize,
    pub error_count: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub success_rate: f64,
    pub overall_status: ValidationStatus,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub timestamp: DateTime<Utc>,
    pub results: Vec<ReportEntry>,
    pub metadata: BTreeMap<String, Value>,
}

impl ValidationReport {
    pub fn new(results: Vec<ReportEntry>, metadata: BTreeMap<String, Value>) -> Self {
        Self {
            timestamp: Utc::now(),
            results,
            metadata,
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn valid_count(&self) -> usize {
        self.results.iter().filter(|e| e.result.is_valid()).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.total() - self.valid_count()
    }

    /// Results whose status is `Warning`
    pub fn warning_count(&self) -> usize {
        self.count_status(ValidationStatus::Warning)
    }

    /// Results whose status is `Error`
    pub fn error_count(&self) -> usize {
        self.count_status(ValidationStatus::Error)
    }

    fn count_status(&self, status: ValidationStatus) -> usize {
        self.results.iter().filter(|e| e.result.status() == status).count()
    }

    pub fn total_errors(&self) -> usize {
        self.results.iter().map(|e| e.result.errors().len()).sum()
    }

    pub fn total_warnings(&self) -> usize {
        self.results.iter().map(|e| e.result.warnings().len()).sum()
    }

    /// Percentage of valid results; an empty report counts as 100%
    pub fn success_rate(&self) -> f64 {
        if self.results.is_empty() {
            return 100.0;
        }
        self.valid_count() as f64 / self.total() as f64 * 100.0
    }

    /// `Error` if anything is invalid, `Warning` if anything warned, else `Valid`
    pub fn overall_status(&self) -> ValidationStatus {
        if self.invalid_count() > 0 {
            ValidationStatus::Error
        } else if self.warning_count() > 0 || self.total_warnings() > 0 {
            ValidationStatus::Warning
        } else {
            ValidationStatus::Valid
        }
    }

    pub fn failed(&self) -> impl Iterator<Item = &ReportEntry> {
        self.results.iter().filter(|e| !e.result.is_valid())
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total_validations: self.total(),
            valid_count: self.valid_count(),
            invalid_count: self.invalid_count(),
            warning_count: self.warning_count(),
            error_count: self.error_count(),
            total_errors: self.total_errors(),
            total_warnings: self.total_warnings(),
            success_rate: self.success_rate(),
            overall_status: self.overall_status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, result: ValidationResult) -> ReportEntry {
        ReportEntry::new(name, Arc::new(result))
    }

    fn mixed_report() -> ValidationReport {
        ValidationReport::new(
            vec![
                entry("python_version", ValidationResult::valid("Python 3.12.1")),
                entry(
                    "project_structure",
                    ValidationResult::warning("Missing recommended paths", vec!["tests".to_string()]),
                ),
                entry(
                    "toolchain",
                    ValidationResult::error("Missing tools", vec!["git".to_string(), "uv".to_string()]),
                ),
            ],
            BTreeMap::new(),
        )
    }

    #[test]
    fn test_counts() {
        let report = mixed_report();
        assert_eq!(report.total(), 3);
        assert_eq!(report.valid_count(), 2);
        assert_eq!(report.invalid_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.total_errors(), 2);
        assert_eq!(report.total_warnings(), 1);
    }

    #[test]
    fn test_success_rate_and_status() {
        let report = mixed_report();
        assert!((report.success_rate() - 66.666).abs() < 0.01);
        assert_eq!(report.overall_status(), ValidationStatus::Error);
    }

    #[test]
    fn test_failed_entries() {
        let report = mixed_report();
        let failed: Vec<&str> = report.failed().map(|e| e.validator.as_str()).collect();
        assert_eq!(failed, vec!["toolchain"]);
    }

    #[test]
    fn test_empty_report() {
        let report = ValidationReport::new(Vec::new(), BTreeMap::new());
        assert_eq!(report.success_rate(), 100.0);
        assert_eq!(report.overall_status(), ValidationStatus::Valid);
    }

    #[test]
    fn test_warning_overall_status() {
        let report = ValidationReport::new(
            vec![entry("venv", ValidationResult::warning("No venv", vec!["no .venv".to_string()]))],
            BTreeMap::new(),
        );
        assert_eq!(report.overall_status(), ValidationStatus::Warning);
    }

    #[test]
    fn test_summary_matches_methods() {
        let report = mixed_report();
        let summary = report.summary();
        assert_eq!(summary.total_validations, 3);
        assert_eq!(summary.valid_count, 2);
        assert_eq!(summary.overall_status, ValidationStatus::Error);
    }

    #[test]
    fn test_entry_serializes_flat() {
        let value = serde_json::to_value(entry("toolchain", ValidationResult::error("bad", vec![]))).unwrap();
        assert_eq!(value["validator"], "toolchain");
        assert_eq!(value["is_valid"], false);
        assert_eq!(value["status"], "error");
        assert!(value["validation_time"].is_string());
    }
}
