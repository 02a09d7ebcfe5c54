//! Environment variable presence check
//!
//! Only variable names ever reach the result; values may be secrets.

use async_trait::async_trait;
use serde_json::json;

use super::{run_settings, section};
use crate::config::EnvironmentConfig;
use crate::error::Result;
use crate::validation::{RegisteredValidator, ResultCache, ValidationContext, ValidationResult, Validator};

pub struct EnvironmentValidator {
    required: Vec<String>,
    recommended: Vec<String>,
    cache: ResultCache,
}

impl EnvironmentValidator {
    pub fn new(required: Vec<String>, recommended: Vec<String>) -> Self {
        Self {
            required,
            recommended,
            cache: ResultCache::new(),
        }
    }

    fn unset<'a>(ctx: &ValidationContext, names: &'a [String]) -> Vec<&'a str> {
        names
            .iter()
            .filter(|name| ctx.env(name).is_none_or(str::is_empty))
            .map(String::as_str)
            .collect()
    }
}

#[async_trait]
impl Validator for EnvironmentValidator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Required environment variables are set"
    }

    fn cache(&self) -> Option<&ResultCache> {
        Some(&self.cache)
    }

    async fn perform_validation(&self, ctx: &ValidationContext) -> Result<ValidationResult> {
        let missing_required = Self::unset(ctx, &self.required);
        let missing_recommended = Self::unset(ctx, &self.recommended);
        let data = json!({
            "checked": self.required.len() + self.recommended.len(),
            "missing_required": missing_required,
            "missing_recommended": missing_recommended,
        });

        let result = if !missing_required.is_empty() {
            ValidationResult::error(
                format!("{} required variable(s) not set", missing_required.len()),
                missing_required.iter().map(|name| format!("{} is not set", name)).collect(),
            )
        } else if !missing_recommended.is_empty() {
            ValidationResult::warning(
                format!("{} recommended variable(s) not set", missing_recommended.len()),
                Vec::new(),
            )
        } else {
            ValidationResult::valid("Environment variables are set")
        };

        Ok(result
            .with_warnings(missing_recommended.iter().map(|name| format!("{} is not set", name)))
            .with_data(data))
    }
}

impl RegisteredValidator for EnvironmentValidator {
    const NAME: &'static str = "environment";

    fn from_context(ctx: &ValidationContext) -> Result<Self> {
        let environment: EnvironmentConfig = section(ctx, "environment")?;
        let (cache, _) = run_settings(ctx)?;
        Ok(Self {
            required: environment.required_vars,
            recommended: environment.recommended_vars,
            cache,
        })
    }
}
