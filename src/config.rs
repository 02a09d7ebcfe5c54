use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DevsetupError, Result};
use crate::report::ReportFormat;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub validation: ValidationConfig,
    pub python: PythonConfig,
    pub project: ProjectConfig,
    pub toolchain: ToolchainConfig,
    pub environment: EnvironmentConfig,
    pub report: ReportConfig,
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub cache_enabled: bool,
    pub cache_ttl_secs: u64,
    pub fail_fast: bool,
    pub parallel: bool,
    pub probe_timeout_ms: u64,
    /// Registry names to run, in order
    pub enabled: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl_secs: 300,
            fail_fast: false,
            parallel: false,
            probe_timeout_ms: 10000,
            enabled: vec![
                "python_version".to_string(),
                "virtualenv".to_string(),
                "project_structure".to_string(),
                "toolchain".to_string(),
                "environment".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    pub executable: String,
    pub min_version: String,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            executable: "python3".to_string(),
            min_version: "3.10".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub required_paths: Vec<PathBuf>,
    pub recommended_paths: Vec<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            required_paths: vec![PathBuf::from("pyproject.toml"), PathBuf::from("src")],
            recommended_paths: vec![
                PathBuf::from("tests"),
                PathBuf::from("README.md"),
                PathBuf::from(".gitignore"),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    pub required: Vec<String>,
    pub optional: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            required: vec!["git".to_string()],
            optional: vec!["uv".to_string(), "ruff".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub required_vars: Vec<String>,
    pub recommended_vars: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
    pub color: bool,
    pub verbose: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Console,
            output: None,
            color: true,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionPreference {
    #[default]
    Auto,
    Gzip,
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashPreference {
    #[default]
    Auto,
    Blake3,
    Sha256,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub fast_mode: bool,
    pub compression: CompressionPreference,
    pub hash: HashPreference,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            validation: ValidationConfig::default(),
            python: PythonConfig::default(),
            project: ProjectConfig::default(),
            toolchain: ToolchainConfig::default(),
            environment: EnvironmentConfig::default(),
            report: ReportConfig::default(),
            performance: PerformanceConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            DevsetupError::Config(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;

        let config: Self = serde_yaml::from_str(&content)?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// One settings entry per section, for `ValidationContext::config`
    pub fn as_context_settings(&self) -> Result<BTreeMap<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(sections) => Ok(sections.into_iter().collect()),
            other => Err(DevsetupError::Config(format!("Config serialized to non-object: {}", other))),
        }
    }
}
