//! Shared, read-only input for a validation run

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Workspace path, environment and settings handed to every validator.
///
/// Validators only ever see `&ValidationContext`; a run builds one context
/// up front and never mutates it while validators execute.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Root of the project being checked
    pub workspace_root: PathBuf,
    /// Environment variables visible to validators and their probes
    pub environment: BTreeMap<String, String>,
    /// Free-form settings, one entry per config section
    pub config: BTreeMap<String, Value>,
    /// Whether validators may serve cached results
    pub cache_enabled: bool,
    /// Whether validators should attach extra detail
    pub verbose: bool,
}

impl ValidationContext {
    /// Create a context with an empty environment and no settings
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            environment: BTreeMap::new(),
            config: BTreeMap::new(),
            cache_enabled: true,
            verbose: false,
        }
    }

    /// Create a context that snapshots the current process environment
    pub fn from_process_env(workspace_root: impl Into<PathBuf>) -> Self {
        Self::new(workspace_root).with_environment(std::env::vars())
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn with_environment(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.environment.extend(vars);
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Look up an environment variable
    pub fn env(&self, key: &str) -> Option<&str> {
        self.environment.get(key).map(String::as_str)
    }

    /// Resolve a path relative to the workspace root
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.workspace_root.join(relative)
    }

    /// Deserialize a settings section, `None` when absent
    pub fn setting<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.config
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(Into::into)
    }

    /// Stable digest of workspace root, environment and settings.
    ///
    /// Both maps are ordered, so equal contexts always hash equal. Every
    /// field is length-prefixed, so no two distinct contexts share an input.
    pub fn fingerprint(&self) -> String {
        fn field(hasher: &mut Sha256, bytes: &[u8]) {
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }

        let mut hasher = Sha256::new();
        field(&mut hasher, self.workspace_root.to_string_lossy().as_bytes());
        hasher.update((self.environment.len() as u64).to_le_bytes());
        for (key, value) in &self.environment {
            field(&mut hasher, key.as_bytes());
            field(&mut hasher, value.as_bytes());
        }
        hasher.update((self.config.len() as u64).to_le_bytes());
        for (key, value) in &self.config {
            field(&mut hasher, key.as_bytes());
            field(&mut hasher, value.to_string().as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Cache key for a named validator under this context
    pub fn cache_key(&self, validator: &str) -> String {
        format!("{}:{}", validator, self.fingerprint())
    }
}
