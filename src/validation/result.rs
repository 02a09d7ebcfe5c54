//! Validation outcome records
//!
//! A `ValidationResult` is immutable once built. The only way to set
//! `is_valid`/`status` is through the constructors, which reconcile the pair
//! so that an `Error` status never reports as valid.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Coarse outcome of a validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Warning,
    Error,
    Unknown,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Valid => "valid",
            ValidationStatus::Warning => "warning",
            ValidationStatus::Error => "error",
            ValidationStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single validation
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult<T = Value> {
    is_valid: bool,
    status: ValidationStatus,
    message: String,
    data: Option<T>,
    errors: Vec<String>,
    warnings: Vec<String>,
    recommendations: Vec<String>,
    metadata: BTreeMap<String, Value>,
    validation_time: DateTime<Utc>,
}

impl<T> ValidationResult<T> {
    /// Create a result, repairing an inconsistent `is_valid`/`status` pair
    ///
    /// `is_valid = true` with `Error` becomes invalid; `is_valid = false`
    /// with `Valid` becomes `Error`. Both repairs are logged.
    pub fn new(is_valid: bool, status: ValidationStatus, message: impl Into<String>) -> Self {
        Self {
            is_valid,
            status,
            message: message.into(),
            data: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            recommendations: Vec::new(),
            metadata: BTreeMap::new(),
            validation_time: Utc::now(),
        }
        .reconciled()
    }

    /// Create a passing result
    pub fn valid(message: impl Into<String>) -> Self {
        Self::new(true, ValidationStatus::Valid, message)
    }

    /// Create a passing result that carries warnings
    pub fn warning(message: impl Into<String>, warnings: Vec<String>) -> Self {
        Self::new(true, ValidationStatus::Warning, message).with_warnings(warnings)
    }

    /// Create a failing result with errors
    pub fn error(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self::new(false, ValidationStatus::Error, message).with_errors(errors)
    }

    /// Create a result whose outcome could not be determined
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(false, ValidationStatus::Unknown, message)
    }

    fn reconciled(mut self) -> Self {
        match (self.is_valid, self.status) {
            (true, ValidationStatus::Error) => {
                tracing::warn!(message = %self.message, "Result marked valid with error status, forcing invalid");
                self.is_valid = false;
            }
            (false, ValidationStatus::Valid) => {
                tracing::warn!(message = %self.message, "Result marked invalid with valid status, forcing error status");
                self.status = ValidationStatus::Error;
            }
            _ => {}
        }
        self
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    pub fn with_errors(mut self, errors: impl IntoIterator<Item = String>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendations.push(recommendation.into());
        self
    }

    pub fn with_recommendations(mut self, recommendations: impl IntoIterator<Item = String>) -> Self {
        self.recommendations.extend(recommendations);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn status(&self) -> ValidationStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    pub fn validation_time(&self) -> DateTime<Utc> {
        self.validation_time
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Transform the payload, keeping every other field
    pub fn map_data<U>(self, f: impl FnOnce(T) -> U) -> ValidationResult<U> {
        ValidationResult {
            is_valid: self.is_valid,
            status: self.status,
            message: self.message,
            data: self.data.map(f),
            errors: self.errors,
            warnings: self.warnings,
            recommendations: self.recommendations,
            metadata: self.metadata,
            validation_time: self.validation_time,
        }
    }
}

impl<T: Serialize> ValidationResult<T> {
    /// Erase a typed payload into JSON so the result can travel through
    /// `dyn Validator` and reports
    pub fn into_untyped(self) -> Result<ValidationResult<Value>> {
        let data = self.data.as_ref().map(serde_json::to_value).transpose()?;
        Ok(ValidationResult {
            is_valid: self.is_valid,
            status: self.status,
            message: self.message,
            data,
            errors: self.errors,
            warnings: self.warnings,
            recommendations: self.recommendations,
            metadata: self.metadata,
            validation_time: self.validation_time,
        })
    }
}

impl ValidationResult<Value> {
    /// Synthetic error result for a validator that failed to run
    pub fn from_failure(validator: &str, error: &dyn std::error::Error) -> Self {
        let message = format!("Validator '{}' raised an error: {}", validator, error);
        Self::error(message.clone(), vec![message]).with_metadata("exception", true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DevsetupError;

    #[test]
    fn test_valid_result() {
        let result: ValidationResult = ValidationResult::valid("ok");
        assert!(result.is_valid());
        assert_eq!(result.status(), ValidationStatus::Valid);
        assert_eq!(result.message(), "ok");
        assert!(result.errors().is_empty());
        assert!(result.data().is_none());
    }

    #[test]
    fn test_error_result() {
        let result: ValidationResult = ValidationResult::error("bad", vec!["missing file".to_string()]);
        assert!(!result.is_valid());
        assert_eq!(result.status(), ValidationStatus::Error);
        assert_eq!(result.errors(), &["missing file".to_string()]);
    }

    #[test]
    fn test_warning_result_is_valid() {
        let result: ValidationResult = ValidationResult::warning("meh", vec!["no tests dir".to_string()]);
        assert!(result.is_valid());
        assert_eq!(result.status(), ValidationStatus::Warning);
        assert!(result.has_warnings());
    }

    #[test]
    fn test_error_status_forces_invalid() {
        let result: ValidationResult = ValidationResult::new(true, ValidationStatus::Error, "contradiction");
        assert!(!result.is_valid());
        assert_eq!(result.status(), ValidationStatus::Error);
    }

    #[test]
    fn test_invalid_with_valid_status_becomes_error() {
        let result: ValidationResult = ValidationResult::new(false, ValidationStatus::Valid, "contradiction");
        assert!(!result.is_valid());
        assert_eq!(result.status(), ValidationStatus::Error);
    }

    #[test]
    fn test_error_status_never_valid_for_any_input() {
        for is_valid in [true, false] {
            for status in [
                ValidationStatus::Valid,
                ValidationStatus::Warning,
                ValidationStatus::Error,
                ValidationStatus::Unknown,
            ] {
                let result: ValidationResult = ValidationResult::new(is_valid, status, "x");
                if result.status() == ValidationStatus::Error {
                    assert!(!result.is_valid());
                }
            }
        }
    }

    #[test]
    fn test_unknown_result() {
        let result: ValidationResult = ValidationResult::unknown("could not tell");
        assert!(!result.is_valid());
        assert_eq!(result.status(), ValidationStatus::Unknown);
    }

    #[test]
    fn test_builder_fields() {
        let result: ValidationResult<u32> = ValidationResult::valid("ok")
            .with_data(7)
            .with_warning("w1")
            .with_recommendation("r1")
            .with_metadata("source", "test");
        assert_eq!(result.data(), Some(&7));
        assert_eq!(result.warnings(), &["w1".to_string()]);
        assert_eq!(result.recommendations(), &["r1".to_string()]);
        assert_eq!(result.metadata().get("source"), Some(&Value::from("test")));
    }

    #[test]
    fn test_map_data() {
        let result: ValidationResult<u32> = ValidationResult::valid("ok").with_data(2);
        let mapped = result.map_data(|n| n * 10);
        assert_eq!(mapped.data(), Some(&20));
        assert!(mapped.is_valid());
    }

    #[test]
    fn test_into_untyped() {
        #[derive(Serialize)]
        struct Probe {
            version: String,
        }

        let result = ValidationResult::valid("ok").with_data(Probe {
            version: "3.12.1".to_string(),
        });
        let untyped = result.into_untyped().unwrap();
        assert_eq!(untyped.data().unwrap()["version"], "3.12.1");
    }

    #[test]
    fn test_from_failure() {
        let err = DevsetupError::Probe("boom".to_string());
        let result = ValidationResult::from_failure("python_version", &err);
        assert!(!result.is_valid());
        assert_eq!(result.status(), ValidationStatus::Error);
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].contains("python_version"));
        assert!(result.errors()[0].contains("boom"));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ValidationStatus::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
        assert_eq!(ValidationStatus::Error.to_string(), "error");
    }
}
