//! Python interpreter check

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::probe::{ProbeOutcome, run_probe};
use super::{run_settings, section};
use crate::config::PythonConfig;
use crate::error::{DevsetupError, Result};
use crate::validation::{RegisteredValidator, ResultCache, ValidationContext, ValidationResult, Validator};

/// `major.minor.patch` interpreter version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PythonVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for PythonVersion {
    type Err = DevsetupError;

    /// Accepts `3.12`, `3.12.1`, `Python 3.12.1` and suffixed forms like `3.13.0rc1`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DevsetupError::Config(format!("Invalid Python version: {:?}", s));
        let text = s.trim();
        let text = text.strip_prefix("Python").map(str::trim_start).unwrap_or(text);
        let token = text.split_whitespace().next().ok_or_else(invalid)?;

        let mut parts = token.splitn(3, '.');
        let mut component = |required: bool| -> Result<u32> {
            match parts.next() {
                Some(part) => {
                    let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
                    digits.parse().map_err(|_| invalid())
                }
                None if required => Err(invalid()),
                None => Ok(0),
            }
        };

        let major = component(true)?;
        let minor = component(true)?;
        let patch = component(false)?;
        Ok(Self::new(major, minor, patch))
    }
}

/// Checks that the configured interpreter exists and meets the minimum version
pub struct PythonVersionValidator {
    executable: String,
    min_version: PythonVersion,
    timeout: Duration,
    cache: ResultCache,
}

impl PythonVersionValidator {
    pub fn new(executable: impl Into<String>, min_version: PythonVersion) -> Self {
        Self {
            executable: executable.into(),
            min_version,
            timeout: Duration::from_secs(10),
            cache: ResultCache::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn min_version(&self) -> PythonVersion {
        self.min_version
    }
}

#[async_trait]
impl Validator for PythonVersionValidator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Python interpreter is installed and recent enough"
    }

    fn cache(&self) -> Option<&ResultCache> {
        Some(&self.cache)
    }

    async fn perform_validation(&self, ctx: &ValidationContext) -> Result<ValidationResult> {
        let output = match run_probe(&self.executable, &["--version"], ctx, self.timeout).await? {
            ProbeOutcome::Completed(output) => output,
            ProbeOutcome::NotFound => {
                return Ok(ValidationResult::error(
                    "Python interpreter not found",
                    vec![format!("'{}' is not on PATH", self.executable)],
                )
                .with_recommendation(format!("Install Python {} or newer", self.min_version)));
            }
            ProbeOutcome::TimedOut => {
                return Err(DevsetupError::Probe(format!(
                    "'{} --version' timed out after {}ms",
                    self.executable,
                    self.timeout.as_millis()
                )));
            }
        };

        if !output.success {
            return Ok(ValidationResult::error(
                "Python interpreter failed to report its version",
                vec![format!(
                    "'{} --version' exited with {}",
                    self.executable,
                    output.code.map_or_else(|| "a signal".to_string(), |c| format!("code {}", c))
                )],
            ));
        }

        let line = output.first_line().unwrap_or_default();
        let version: PythonVersion = match line.parse() {
            Ok(version) => version,
            Err(_) => {
                return Ok(ValidationResult::error(
                    "Could not parse Python version",
                    vec![format!("Unexpected output: {:?}", line)],
                ));
            }
        };
        tracing::debug!(executable = %self.executable, %version, "Found Python interpreter");

        let data = json!({
            "executable": self.executable,
            "version": version.to_string(),
        });

        if version < self.min_version {
            return Ok(ValidationResult::error(
                format!("Python {} is older than required {}", version, self.min_version),
                vec![format!("Python {} or newer is required", self.min_version)],
            )
            .with_data(data)
            .with_recommendation(format!("Install Python {} or newer", self.min_version))
            .with_metadata("min_version", self.min_version.to_string()));
        }

        Ok(ValidationResult::valid(format!("Python {}", version))
            .with_data(data)
            .with_metadata("min_version", self.min_version.to_string()))
    }
}

impl RegisteredValidator for PythonVersionValidator {
    const NAME: &'static str = "python_version";

    fn from_context(ctx: &ValidationContext) -> Result<Self> {
        let python: PythonConfig = section(ctx, "python")?;
        let (cache, timeout) = run_settings(ctx)?;
        Ok(Self {
            executable: python.executable,
            min_version: python.min_version.parse()?,
            timeout,
            cache,
        })
    }
}
