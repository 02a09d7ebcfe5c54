//! Composite Validator
//! Runs multiple validators and merges their outcomes

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value, json};

use super::context::ValidationContext;
use super::result::{ValidationResult, ValidationStatus};
use super::traits::Validator;
use crate::perf::PerformanceMonitor;
use crate::report::{ReportEntry, ValidationReport};

/// Message of an aggregate result where every validator passed
pub const ALL_PASSED_MESSAGE: &str = "All validations passed successfully";

/// Aggregate metadata keys that per-validator entries may not take
const RESERVED_METADATA_KEYS: [&str; 2] = ["validators_run", "durations_ms"];

/// Metadata key for `name`, suffixed `#2`, `#3`... when already taken or reserved
fn metadata_key(name: &str, taken: &Map<String, Value>) -> String {
    let free = |key: &str| !taken.contains_key(key) && !RESERVED_METADATA_KEYS.contains(&key);
    if free(name) {
        return name.to_string();
    }
    (2..)
        .map(|n| format!("{}#{}", name, n))
        .find(|key| free(key))
        .unwrap_or_else(|| name.to_string())
}

/// Counts over the most recent run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompositeSummary {
    /// Validators configured on the composite
    pub total_validators: usize,
    /// Validators that actually ran (fewer under fail-fast)
    pub executed: usize,
    pub passed: usize,
    pub failed: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
}

/// Runs validators in order and aggregates their results.
///
/// A validator that returns `Err` is recorded as a synthetic error result
/// instead of aborting the batch. With `fail_fast`, the run stops after the
/// first invalid result.
pub struct CompositeValidator {
    validators: Vec<Arc<dyn Validator>>,
    description: String,
    fail_fast: bool,
    parallel: bool,
    monitor: Option<Arc<PerformanceMonitor>>,
    results: Vec<ReportEntry>,
    durations: Vec<Duration>,
}

impl CompositeValidator {
    /// Create a new empty composite validator
    pub fn new() -> Self {
        Self::with_description("composite validator")
    }

    /// Create a new composite validator with a custom description
    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            validators: Vec::new(),
            description: description.into(),
            fail_fast: false,
            parallel: false,
            monitor: None,
            results: Vec::new(),
            durations: Vec::new(),
        }
    }

    /// Add a validator (builder pattern)
    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Add several validators, keeping their order
    pub fn with_validators(mut self, validators: impl IntoIterator<Item = Arc<dyn Validator>>) -> Self {
        self.validators.extend(validators);
        self
    }

    /// Add a validator to an existing composite
    pub fn add(&mut self, validator: Arc<dyn Validator>) {
        self.validators.push(validator);
    }

    /// Stop at the first invalid result
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Run validators concurrently; ignored when fail-fast is on
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Record per-validator wall time into a monitor
    pub fn with_monitor(mut self, monitor: Arc<PerformanceMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the number of validators
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if the composite has no validators
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Names of the configured validators, in run order
    pub fn validator_names(&self) -> Vec<&str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Run every validator and return the aggregate result
    pub async fn validate(&mut self, ctx: &ValidationContext) -> ValidationResult {
        let monitor = self.monitor.as_deref();
        let outcomes: Vec<(ReportEntry, Duration)> = if self.parallel && !self.fail_fast {
            join_all(self.validators.iter().map(|v| run_one(v.as_ref(), ctx, monitor))).await
        } else {
            let mut outcomes = Vec::with_capacity(self.validators.len());
            for validator in &self.validators {
                let outcome = run_one(validator.as_ref(), ctx, monitor).await;
                let stop = self.fail_fast && !outcome.0.result.is_valid();
                outcomes.push(outcome);
                if stop {
                    tracing::info!(
                        validator = validator.name(),
                        composite = %self.description,
                        "Stopping validation early (fail fast)"
                    );
                    break;
                }
            }
            outcomes
        };

        let (results, durations): (Vec<ReportEntry>, Vec<Duration>) = outcomes.into_iter().unzip();
        self.results = results;
        self.durations = durations;
        self.aggregate()
    }

    fn aggregate(&self) -> ValidationResult {
        let summary = self.get_summary();
        let all_valid = self.results.iter().all(|e| e.result.is_valid());

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut recommendations = Vec::new();
        let mut metadata = Map::new();
        let mut durations = Map::new();
        for (entry, duration) in self.results.iter().zip(&self.durations) {
            errors.extend(entry.result.errors().iter().cloned());
            warnings.extend(entry.result.warnings().iter().cloned());
            recommendations.extend(entry.result.recommendations().iter().cloned());
            let nested: Map<String, Value> = entry
                .result
                .metadata()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let key = metadata_key(&entry.validator, &metadata);
            durations.insert(key.clone(), json!(duration.as_secs_f64() * 1000.0));
            metadata.insert(key, Value::Object(nested));
        }

        let status = if !errors.is_empty() {
            ValidationStatus::Error
        } else if !warnings.is_empty() {
            ValidationStatus::Warning
        } else {
            ValidationStatus::Valid
        };
        let message = if all_valid {
            ALL_PASSED_MESSAGE.to_string()
        } else {
            format!("{} of {} validations failed", summary.failed, summary.executed)
        };

        let mut result = ValidationResult::new(all_valid, status, message)
            .with_data(json!(summary))
            .with_errors(errors)
            .with_warnings(warnings)
            .with_recommendations(recommendations)
            .with_metadata("validators_run", summary.executed)
            .with_metadata("durations_ms", Value::Object(durations));
        for (name, nested) in metadata {
            result = result.with_metadata(name, nested);
        }
        result
    }

    /// Results of the most recent run, in execution order
    pub fn get_validator_results(&self) -> &[ReportEntry] {
        &self.results
    }

    pub fn get_failed_validators(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|e| !e.result.is_valid())
            .map(|e| e.validator.as_str())
            .collect()
    }

    pub fn get_successful_validators(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|e| e.result.is_valid())
            .map(|e| e.validator.as_str())
            .collect()
    }

    pub fn get_summary(&self) -> CompositeSummary {
        let passed = self.results.iter().filter(|e| e.result.is_valid()).count();
        CompositeSummary {
            total_validators: self.validators.len(),
            executed: self.results.len(),
            passed,
            failed: self.results.len() - passed,
            total_errors: self.results.iter().map(|e| e.result.errors().len()).sum(),
            total_warnings: self.results.iter().map(|e| e.result.warnings().len()).sum(),
        }
    }

    /// Snapshot the most recent run as a report
    pub fn create_report(&self, metadata: BTreeMap<String, Value>) -> ValidationReport {
        ValidationReport::new(self.results.clone(), metadata)
    }
}

impl Default for CompositeValidator {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_one(
    validator: &dyn Validator,
    ctx: &ValidationContext,
    monitor: Option<&PerformanceMonitor>,
) -> (ReportEntry, Duration) {
    let name = validator.name();
    let start = Instant::now();
    let result = match validator.validate(ctx).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(validator = name, error = %e, "Validator raised an error");
            Arc::new(ValidationResult::from_failure(name, &e))
        }
    };
    let elapsed = start.elapsed();
    if let Some(monitor) = monitor {
        monitor.record(&format!("validator.{}", name), elapsed);
    }
    tracing::debug!(
        validator = name,
        valid = result.is_valid(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Validator finished"
    );
    (ReportEntry::new(name, result), elapsed)
}
