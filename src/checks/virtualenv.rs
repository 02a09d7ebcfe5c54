//! Virtual environment check

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::json;

use super::run_settings;
use crate::error::Result;
use crate::validation::{RegisteredValidator, ResultCache, ValidationContext, ValidationResult, Validator};

const VENV_DIR: &str = ".venv";
const CREATE_HINT: &str = "Create one with `uv venv` or `python3 -m venv .venv`";

/// Passes when `VIRTUAL_ENV` points at a directory or the workspace has a `.venv`
pub struct VirtualEnvValidator {
    cache: ResultCache,
}

impl VirtualEnvValidator {
    pub fn new() -> Self {
        Self {
            cache: ResultCache::new(),
        }
    }
}

impl Default for VirtualEnvValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Validator for VirtualEnvValidator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "A Python virtual environment is active or present"
    }

    fn cache(&self) -> Option<&ResultCache> {
        Some(&self.cache)
    }

    async fn perform_validation(&self, ctx: &ValidationContext) -> Result<ValidationResult> {
        let local = ctx.resolve(VENV_DIR);
        let mut stale = None;

        if let Some(active) = ctx.env("VIRTUAL_ENV").filter(|v| !v.is_empty()) {
            let active = PathBuf::from(active);
            if active.is_dir() {
                return Ok(ValidationResult::valid(format!("Virtual environment active: {}", active.display()))
                    .with_data(json!({"path": active, "active": true})));
            }
            stale = Some(active);
        }

        if local.is_dir() {
            let mut result = ValidationResult::valid(format!("Found virtual environment at {}", local.display()))
                .with_data(json!({"path": local, "active": false}))
                .with_recommendation("Activate it with `source .venv/bin/activate`");
            if let Some(stale) = &stale {
                result = result.with_recommendation(format!(
                    "VIRTUAL_ENV points to {}, which does not exist; deactivate it",
                    stale.display()
                ));
            }
            return Ok(result);
        }

        if let Some(stale) = stale {
            return Ok(ValidationResult::warning(
                "Active virtual environment is missing",
                vec![format!("VIRTUAL_ENV points to {}, which does not exist", stale.display())],
            )
            .with_recommendation(CREATE_HINT)
            .with_data(json!({"path": stale, "active": true})));
        }

        Ok(
            ValidationResult::warning("No virtual environment found", vec![format!("{} does not exist", local.display())])
                .with_recommendation(CREATE_HINT),
        )
    }
}

impl RegisteredValidator for VirtualEnvValidator {
    const NAME: &'static str = "virtualenv";

    fn from_context(ctx: &ValidationContext) -> Result<Self> {
        let (cache, _) = run_settings(ctx)?;
        Ok(Self { cache })
    }
}
