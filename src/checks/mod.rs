//! Built-in development environment checks
//!
//! Every check builds itself from the settings in a `ValidationContext`
//! and owns a `ResultCache` sized from the `validation` section.

pub mod env_vars;
pub mod probe;
pub mod python;
pub mod structure;
pub mod toolchain;
pub mod virtualenv;

use std::time::Duration;

use crate::config::ValidationConfig;
use crate::error::Result;
use crate::validation::{ResultCache, ValidationContext, ValidatorRegistry};

pub use env_vars::EnvironmentValidator;
pub use probe::{ProbeOutcome, ProbeOutput, run_probe};
pub use python::{PythonVersion, PythonVersionValidator};
pub use structure::ProjectStructureValidator;
pub use toolchain::ToolchainValidator;
pub use virtualenv::VirtualEnvValidator;

/// Registry holding every built-in check
pub fn builtin_registry() -> Result<ValidatorRegistry> {
    let mut registry = ValidatorRegistry::new();
    registry.register::<PythonVersionValidator>()?;
    registry.register::<VirtualEnvValidator>()?;
    registry.register::<ProjectStructureValidator>()?;
    registry.register::<ToolchainValidator>()?;
    registry.register::<EnvironmentValidator>()?;
    Ok(registry)
}

/// Read a settings section, falling back to its defaults
pub(crate) fn section<T>(ctx: &ValidationContext, key: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    Ok(ctx.setting(key)?.unwrap_or_default())
}

/// Cache and probe timeout shared by all checks
pub(crate) fn run_settings(ctx: &ValidationContext) -> Result<(ResultCache, Duration)> {
    let validation: ValidationConfig = section(ctx, "validation")?;
    Ok((
        ResultCache::with_ttl(Duration::from_secs(validation.cache_ttl_secs)),
        Duration::from_millis(validation.probe_timeout_ms),
    ))
}
