//! JSON rendering of validation reports

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::Reporter;
use super::model::{ReportEntry, ReportSummary, ValidationReport};
use crate::error::Result;

#[derive(Serialize)]
struct JsonDocument<'a> {
    timestamp: DateTime<Utc>,
    summary: ReportSummary,
    results: &'a [ReportEntry],
    #[serde(skip_serializing_if = "no_metadata")]
    metadata: &'a BTreeMap<String, Value>,
}

fn no_metadata(metadata: &&BTreeMap<String, Value>) -> bool {
    metadata.is_empty()
}

/// Machine-readable report: `timestamp`, `summary`, `results[]` and
/// `metadata` when present
#[derive(Debug, Clone)]
pub struct JsonReporter {
    pretty: bool,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Emit single-line JSON
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn format_report(&self, report: &ValidationReport) -> Result<String> {
        let document = JsonDocument {
            timestamp: report.timestamp,
            summary: report.summary(),
            results: &report.results,
            metadata: &report.metadata,
        };
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationResult;
    use serde_json::json;
    use std::sync::Arc;

    fn report(metadata: BTreeMap<String, Value>) -> ValidationReport {
        ValidationReport::new(
            vec![
                ReportEntry::new(
                    "python_version",
                    Arc::new(ValidationResult::valid("Python 3.12.1").with_data(json!({"version": "3.12.1"}))),
                ),
                ReportEntry::new(
                    "project_structure",
                    Arc::new(
                        ValidationResult::error("Missing paths", vec!["Missing required path: src".to_string()])
                            .with_recommendation("Create src/"),
                    ),
                ),
            ],
            metadata,
        )
    }

    #[test]
    fn test_parsed_output_matches_report() {
        let source = report(BTreeMap::new());
        let rendered = JsonReporter::new().format_report(&source).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(parsed["summary"]["total_validations"], source.total());
        assert_eq!(parsed["summary"]["valid_count"], source.valid_count());
        let results = parsed["results"].as_array().unwrap();
        assert_eq!(results.len(), source.results.len());
        for (parsed, entry) in results.iter().zip(&source.results) {
            assert_eq!(parsed["is_valid"], entry.result.is_valid());
        }
    }

    #[test]
    fn test_result_fields_present() {
        let rendered = JsonReporter::new().format_report(&report(BTreeMap::new())).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        let failed = &parsed["results"][1];

        for key in [
            "is_valid",
            "status",
            "message",
            "data",
            "errors",
            "warnings",
            "recommendations",
            "metadata",
            "validation_time",
        ] {
            assert!(failed.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(failed["status"], "error");
        assert_eq!(failed["recommendations"][0], "Create src/");
        assert_eq!(parsed["results"][0]["data"]["version"], "3.12.1");
    }

    #[test]
    fn test_metadata_omitted_when_empty() {
        let rendered = JsonReporter::new().format_report(&report(BTreeMap::new())).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert!(parsed.get("metadata").is_none());
        assert!(parsed.get("timestamp").is_some());
    }

    #[test]
    fn test_metadata_included_when_present() {
        let metadata = BTreeMap::from([("workspace".to_string(), json!("/proj"))]);
        let rendered = JsonReporter::new().format_report(&report(metadata)).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["metadata"]["workspace"], "/proj");
    }

    #[test]
    fn test_compact_is_single_line() {
        let rendered = JsonReporter::new().compact().format_report(&report(BTreeMap::new())).unwrap();
        assert!(!rendered.contains('\n'));
    }
}
