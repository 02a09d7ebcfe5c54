//! Static HTML report
//!
//! Rendered through a Handlebars page template with the default HTML escape
//! function, so every value coming from validators is escaped.

use handlebars::Handlebars;
use serde_json::{Value, json};

use super::Reporter;
use super::model::{ReportEntry, ValidationReport};
use crate::error::{DevsetupError, Result};
use crate::validation::ValidationStatus;

const PAGE: &str = "page";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style>
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2rem; color: #222; }
h1 { border-bottom: 2px solid #ddd; padding-bottom: .5rem; }
table.summary { border-collapse: collapse; margin-bottom: 2rem; }
table.summary td, table.summary th { border: 1px solid #ddd; padding: .4rem .8rem; text-align: left; }
.result { border-left: 6px solid #999; background: #fafafa; margin: 1rem 0; padding: .6rem 1rem; }
.result.valid { border-color: #2e7d32; }
.result.warning { border-color: #f9a825; }
.result.error { border-color: #c62828; }
.result.unknown { border-color: #757575; }
.errors li { color: #c62828; }
.warnings li { color: #8d6e00; }
.recommendations li { color: #1565c0; }
</style>
</head>
<body>
<h1>{{title}}</h1>
<p>Generated {{generated}}</p>
<table class="summary">
{{#each rows}}
<tr><th>{{label}}</th><td>{{value}}</td></tr>
{{/each}}
</table>
<h2>Results</h2>
{{#each results}}
<div class="result {{class}}">
<h3>{{validator}} <small>({{status}})</small></h3>
<p>{{message}}</p>
{{#if errors}}
<h4>Errors</h4>
<ul class="errors">
{{#each errors}}
<li>{{this}}</li>
{{/each}}
</ul>
{{/if}}
{{#if warnings}}
<h4>Warnings</h4>
<ul class="warnings">
{{#each warnings}}
<li>{{this}}</li>
{{/each}}
</ul>
{{/if}}
{{#if recommendations}}
<h4>Recommendations</h4>
<ul class="recommendations">
{{#each recommendations}}
<li>{{this}}</li>
{{/each}}
</ul>
{{/if}}
</div>
{{/each}}
</body>
</html>
"#;

/// Self-contained HTML page with embedded CSS
#[derive(Debug, Clone)]
pub struct HtmlReporter {
    title: String,
    handlebars: Handlebars<'static>,
}

impl HtmlReporter {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        // A broken template surfaces as a render error from format_report
        if let Err(e) = handlebars.register_template_string(PAGE, PAGE_TEMPLATE) {
            tracing::error!(error = %e, "Failed to register HTML report template");
        }
        Self {
            title: "Development Environment Validation".to_string(),
            handlebars,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn entry_context(entry: &ReportEntry) -> Value {
        let result = &entry.result;
        let class = match (result.is_valid(), result.status()) {
            (false, ValidationStatus::Unknown) => "unknown",
            (false, _) => "error",
            (true, ValidationStatus::Warning) => "warning",
            (true, _) => "valid",
        };
        json!({
            "validator": entry.validator,
            "class": class,
            "status": result.status().as_str(),
            "message": result.message(),
            "errors": result.errors(),
            "warnings": result.warnings(),
            "recommendations": result.recommendations(),
        })
    }
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for HtmlReporter {
    fn format_report(&self, report: &ValidationReport) -> Result<String> {
        let summary = report.summary();
        let rows: Vec<Value> = [
            ("Validations", summary.total_validations.to_string()),
            ("Passed", summary.valid_count.to_string()),
            ("Failed", summary.invalid_count.to_string()),
            ("Errors", summary.total_errors.to_string()),
            ("Warnings", summary.total_warnings.to_string()),
            ("Success rate", format!("{:.1}%", summary.success_rate)),
            ("Status", summary.overall_status.to_string()),
        ]
        .into_iter()
        .map(|(label, value)| json!({"label": label, "value": value}))
        .collect();

        let context = json!({
            "title": self.title,
            "generated": report.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            "rows": rows,
            "results": report.results.iter().map(Self::entry_context).collect::<Vec<_>>(),
        });

        self.handlebars
            .render(PAGE, &context)
            .map_err(|e| DevsetupError::Report(format!("Failed to render HTML report: {}", e)))
    }
}
