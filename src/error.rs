//! Error types for devsetup
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in devsetup
#[derive(Debug, Error)]
pub enum DevsetupError {
    /// A validator name was registered twice
    #[error("Validator already registered: {0}")]
    DuplicateValidator(String),

    /// Lookup of a validator name that was never registered
    #[error("Unknown validator: {0}")]
    UnknownValidator(String),

    /// A validator could not complete its check
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// External tool probe error (spawn, timeout)
    #[error("Probe error: {0}")]
    Probe(String),

    /// Report rendering or writing error
    #[error("Report error: {0}")]
    Report(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Connection pool error
    #[error("Pool error: {0}")]
    Pool(String),

    /// Compression backend error
    #[error("Compression error: {0}")]
    Compression(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for devsetup operations
pub type Result<T> = std::result::Result<T, DevsetupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_validator_error() {
        let err = DevsetupError::DuplicateValidator("python_version".to_string());
        assert_eq!(err.to_string(), "Validator already registered: python_version");
    }

    #[test]
    fn test_unknown_validator_error() {
        let err = DevsetupError::UnknownValidator("nope".to_string());
        assert_eq!(err.to_string(), "Unknown validator: nope");
    }

    #[test]
    fn test_validation_failed_error() {
        let err = DevsetupError::ValidationFailed("could not read pyproject.toml".to_string());
        assert_eq!(err.to_string(), "Validation failed: could not read pyproject.toml");
    }

    #[test]
    fn test_probe_error() {
        let err = DevsetupError::Probe("timed out".to_string());
        assert_eq!(err.to_string(), "Probe error: timed out");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DevsetupError = io_err.into();
        assert!(matches!(err, DevsetupError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: DevsetupError = json_err.into();
        assert!(matches!(err, DevsetupError::Json(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [unclosed").unwrap_err();
        let err: DevsetupError = yaml_err.into();
        assert!(matches!(err, DevsetupError::Yaml(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(DevsetupError::Config("bad".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
