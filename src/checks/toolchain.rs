//! Command-line tool availability check

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;

use super::probe::{ProbeOutcome, run_probe};
use super::{run_settings, section};
use crate::config::ToolchainConfig;
use crate::error::Result;
use crate::validation::{RegisteredValidator, ResultCache, ValidationContext, ValidationResult, Validator};

#[derive(Debug)]
enum ToolState {
    Available(String),
    Missing(String),
}

/// Probes `<tool> --version` for every required and optional tool
pub struct ToolchainValidator {
    required: Vec<String>,
    optional: Vec<String>,
    timeout: Duration,
    cache: ResultCache,
}

impl ToolchainValidator {
    pub fn new(required: Vec<String>, optional: Vec<String>) -> Self {
        Self {
            required,
            optional,
            timeout: Duration::from_secs(10),
            cache: ResultCache::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn probe(&self, tool: &str, ctx: &ValidationContext) -> Result<ToolState> {
        let state = match run_probe(tool, &["--version"], ctx, self.timeout).await? {
            ProbeOutcome::Completed(output) if output.success => {
                ToolState::Available(output.first_line().unwrap_or("unknown version").to_string())
            }
            ProbeOutcome::Completed(output) => ToolState::Missing(format!(
                "{} --version exited with code {}",
                tool,
                output.code.unwrap_or(-1)
            )),
            ProbeOutcome::NotFound => ToolState::Missing(format!("{} not found on PATH", tool)),
            ProbeOutcome::TimedOut => ToolState::Missing(format!("{} --version timed out", tool)),
        };
        Ok(state)
    }
}

#[async_trait]
impl Validator for ToolchainValidator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Required development tools are installed"
    }

    fn cache(&self) -> Option<&ResultCache> {
        Some(&self.cache)
    }

    async fn perform_validation(&self, ctx: &ValidationContext) -> Result<ValidationResult> {
        let tools: Vec<(&String, bool)> = self
            .required
            .iter()
            .map(|tool| (tool, true))
            .chain(self.optional.iter().map(|tool| (tool, false)))
            .collect();
        let states = join_all(tools.iter().map(|(tool, _)| self.probe(tool, ctx))).await;

        let mut versions = BTreeMap::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut recommendations = Vec::new();

        for ((tool, required), state) in tools.into_iter().zip(states) {
            match state? {
                ToolState::Available(version) => {
                    versions.insert(tool.clone(), Value::String(version));
                }
                ToolState::Missing(reason) if required => errors.push(reason),
                ToolState::Missing(reason) => {
                    warnings.push(reason);
                    recommendations.push(format!("Install {} for the full development workflow", tool));
                }
            }
        }

        let result = if !errors.is_empty() {
            ValidationResult::error(format!("{} required tool(s) unavailable", errors.len()), errors)
        } else if !warnings.is_empty() {
            ValidationResult::warning(format!("{} optional tool(s) unavailable", warnings.len()), Vec::new())
        } else {
            ValidationResult::valid(format!("All {} tools available", versions.len()))
        };

        Ok(result
            .with_warnings(warnings)
            .with_recommendations(recommendations)
            .with_data(Value::Object(versions.into_iter().collect())))
    }
}

impl RegisteredValidator for ToolchainValidator {
    const NAME: &'static str = "toolchain";

    fn from_context(ctx: &ValidationContext) -> Result<Self> {
        let toolchain: ToolchainConfig = section(ctx, "toolchain")?;
        let (cache, timeout) = run_settings(ctx)?;
        Ok(Self {
            required: toolchain.required,
            optional: toolchain.optional,
            timeout,
            cache,
        })
    }
}
