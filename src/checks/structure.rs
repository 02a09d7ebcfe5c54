//! Project layout check

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::json;

use super::{run_settings, section};
use crate::config::ProjectConfig;
use crate::error::Result;
use crate::validation::{RegisteredValidator, ResultCache, ValidationContext, ValidationResult, Validator};

/// Checks required and recommended paths under the workspace root
pub struct ProjectStructureValidator {
    required: Vec<PathBuf>,
    recommended: Vec<PathBuf>,
    cache: ResultCache,
}

impl ProjectStructureValidator {
    pub fn new(required: Vec<PathBuf>, recommended: Vec<PathBuf>) -> Self {
        Self {
            required,
            recommended,
            cache: ResultCache::new(),
        }
    }

    fn missing(ctx: &ValidationContext, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .filter(|path| !ctx.resolve(path).exists())
            .map(|path| path.display().to_string())
            .collect()
    }
}

#[async_trait]
impl Validator for ProjectStructureValidator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Workspace contains the expected project files"
    }

    fn cache(&self) -> Option<&ResultCache> {
        Some(&self.cache)
    }

    async fn perform_validation(&self, ctx: &ValidationContext) -> Result<ValidationResult> {
        let root = ctx.workspace_root();
        if !root.is_dir() {
            return Ok(ValidationResult::error(
                "Workspace root does not exist",
                vec![format!("{} is not a directory", root.display())],
            ));
        }

        let missing_required = Self::missing(ctx, &self.required);
        let missing_recommended = Self::missing(ctx, &self.recommended);
        let data = json!({
            "missing_required": missing_required,
            "missing_recommended": missing_recommended,
        });

        let result = if !missing_required.is_empty() {
            ValidationResult::error(
                format!("{} required path(s) missing", missing_required.len()),
                missing_required.iter().map(|p| format!("Missing required path: {}", p)).collect(),
            )
        } else if !missing_recommended.is_empty() {
            ValidationResult::warning(
                format!("{} recommended path(s) missing", missing_recommended.len()),
                Vec::new(),
            )
        } else {
            ValidationResult::valid("Project structure looks complete")
        };

        Ok(result
            .with_warnings(missing_recommended.iter().map(|p| format!("Missing recommended path: {}", p)))
            .with_data(data))
    }
}

impl RegisteredValidator for ProjectStructureValidator {
    const NAME: &'static str = "project_structure";

    fn from_context(ctx: &ValidationContext) -> Result<Self> {
        let project: ProjectConfig = section(ctx, "project")?;
        let (cache, _) = run_settings(ctx)?;
        Ok(Self {
            required: project.required_paths,
            recommended: project.recommended_paths,
            cache,
        })
    }
}
