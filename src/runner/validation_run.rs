//! A single validation run over one workspace.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::config::Config;
use crate::error::Result;
use crate::perf::PerformanceMonitor;
use crate::report::{ReportFormat, ValidationReport, reporter_for};
use crate::validation::{CompositeValidator, ValidationContext, ValidationResult, ValidatorRegistry};

/// Per-invocation overrides on top of the loaded config.
///
/// `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub workspace: Option<PathBuf>,
    /// Run only these validators, in this order
    pub only: Vec<String>,
    pub fail_fast: Option<bool>,
    pub parallel: Option<bool>,
    pub no_cache: bool,
    pub format: Option<ReportFormat>,
    pub output: Option<PathBuf>,
    pub verbose: bool,
}

/// What a finished run produced
#[derive(Debug)]
pub struct RunOutcome {
    /// Aggregate result of the composite
    pub result: ValidationResult,
    pub report: ValidationReport,
}

impl RunOutcome {
    pub fn is_valid(&self) -> bool {
        self.result.is_valid()
    }
}

/// Configured run: which validators, with which settings, reported how
pub struct ValidationRun {
    config: Config,
    registry: ValidatorRegistry,
    workspace: PathBuf,
    only: Vec<String>,
    monitor: Arc<PerformanceMonitor>,
}

impl ValidationRun {
    /// Fold `options` into `config` and bind the run to `registry`
    pub fn new(mut config: Config, registry: ValidatorRegistry, options: RunOptions) -> Result<Self> {
        if let Some(fail_fast) = options.fail_fast {
            config.validation.fail_fast = fail_fast;
        }
        if let Some(parallel) = options.parallel {
            config.validation.parallel = parallel;
        }
        if options.no_cache {
            config.validation.cache_enabled = false;
        }
        if let Some(format) = options.format {
            config.report.format = format;
        }
        if options.output.is_some() {
            config.report.output = options.output;
        }
        config.report.verbose |= options.verbose;

        let workspace = match options.workspace {
            Some(path) => path,
            None => std::env::current_dir()?,
        };

        Ok(Self {
            config,
            registry,
            workspace,
            only: options.only,
            monitor: Arc::new(PerformanceMonitor::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workspace(&self) -> &PathBuf {
        &self.workspace
    }

    pub fn monitor(&self) -> &Arc<PerformanceMonitor> {
        &self.monitor
    }

    /// Validator names this run will execute, in order
    pub fn validator_names(&self) -> &[String] {
        if self.only.is_empty() {
            &self.config.validation.enabled
        } else {
            &self.only
        }
    }

    /// Context seen by every validator of this run
    pub fn context(&self) -> Result<ValidationContext> {
        let mut ctx = ValidationContext::from_process_env(&self.workspace)
            .with_cache(self.config.validation.cache_enabled)
            .with_verbose(self.config.report.verbose);
        ctx.config = self.config.as_context_settings()?;
        Ok(ctx)
    }

    /// Build the composite for this run
    pub fn composite(&self, ctx: &ValidationContext) -> Result<CompositeValidator> {
        let validators = self.registry.create_validators(self.validator_names(), ctx)?;
        Ok(CompositeValidator::with_description(format!("devsetup check {}", self.workspace.display()))
            .with_validators(validators)
            .fail_fast(self.config.validation.fail_fast)
            .parallel(self.config.validation.parallel)
            .with_monitor(Arc::clone(&self.monitor)))
    }

    /// Run every selected validator and collect the report
    pub async fn execute(&self) -> Result<RunOutcome> {
        let ctx = self.context()?;
        let mut composite = self.composite(&ctx)?;
        tracing::info!(
            workspace = %self.workspace.display(),
            validators = ?composite.validator_names(),
            fail_fast = self.config.validation.fail_fast,
            parallel = self.config.validation.parallel,
            "Starting validation run"
        );

        let result = composite.validate(&ctx).await;
        let report = composite.create_report(self.report_metadata(&result)?);

        tracing::info!(
            valid = result.is_valid(),
            status = %result.status(),
            executed = report.total(),
            "Validation run finished"
        );
        Ok(RunOutcome { result, report })
    }

    fn report_metadata(&self, result: &ValidationResult) -> Result<BTreeMap<String, Value>> {
        let mut metadata = BTreeMap::new();
        metadata.insert("workspace".to_string(), json!(self.workspace.display().to_string()));
        metadata.insert("version".to_string(), json!(env!("CARGO_PKG_VERSION")));
        metadata.insert("fail_fast".to_string(), json!(self.config.validation.fail_fast));
        metadata.insert("parallel".to_string(), json!(self.config.validation.parallel));
        metadata.insert("cache_enabled".to_string(), json!(self.config.validation.cache_enabled));
        if let Some(durations) = result.metadata().get("durations_ms") {
            metadata.insert("durations_ms".to_string(), durations.clone());
        }
        metadata.insert("timings".to_string(), serde_json::to_value(self.monitor.snapshot())?);
        Ok(metadata)
    }

    /// Render the report to the configured output file, or to `out` when none is set
    pub fn emit(&self, outcome: &RunOutcome, out: &mut dyn Write) -> Result<()> {
        let settings = &self.config.report;
        match &settings.output {
            Some(path) => {
                reporter_for(settings.format, settings.verbose, false).write_to_file(&outcome.report, path)
            }
            None => reporter_for(settings.format, settings.verbose, settings.color).write_report(&outcome.report, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::builtin_registry;
    use tempfile::TempDir;

    fn python_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("pyproject.toml"), "[project]\nname = \"demo\"\n").unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        dir
    }

    fn options(dir: &TempDir, only: &[&str]) -> RunOptions {
        RunOptions {
            workspace: Some(dir.path().to_path_buf()),
            only: only.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_options_override_config() {
        let dir = TempDir::new().unwrap();
        let run = ValidationRun::new(
            Config::default(),
            ValidatorRegistry::new(),
            RunOptions {
                workspace: Some(dir.path().to_path_buf()),
                fail_fast: Some(true),
                parallel: Some(true),
                no_cache: true,
                format: Some(ReportFormat::Json),
                verbose: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert!(run.config().validation.fail_fast);
        assert!(run.config().validation.parallel);
        assert!(!run.config().validation.cache_enabled);
        assert_eq!(run.config().report.format, ReportFormat::Json);
        assert!(run.config().report.verbose);
    }

    #[test]
    fn test_only_replaces_enabled_list() {
        let dir = TempDir::new().unwrap();
        let all = ValidationRun::new(Config::default(), ValidatorRegistry::new(), options(&dir, &[])).unwrap();
        assert_eq!(all.validator_names().len(), 5);

        let some = ValidationRun::new(Config::default(), ValidatorRegistry::new(), options(&dir, &["toolchain"])).unwrap();
        assert_eq!(some.validator_names(), ["toolchain"]);
    }

    #[test]
    fn test_context_carries_sections() {
        let dir = TempDir::new().unwrap();
        let run = ValidationRun::new(
            Config::default(),
            ValidatorRegistry::new(),
            RunOptions {
                no_cache: true,
                ..options(&dir, &[])
            },
        )
        .unwrap();
        let ctx = run.context().unwrap();
        assert_eq!(ctx.workspace_root(), dir.path());
        assert!(!ctx.cache_enabled);
        assert!(ctx.config.contains_key("python"));
    }

    #[tokio::test]
    async fn test_unknown_validator_fails_run() {
        let dir = TempDir::new().unwrap();
        let run = ValidationRun::new(Config::default(), builtin_registry().unwrap(), options(&dir, &["nope"])).unwrap();
        assert!(run.execute().await.is_err());
    }

    #[tokio::test]
    async fn test_structure_only_run() {
        let dir = python_project();
        let run = ValidationRun::new(
            Config::default(),
            builtin_registry().unwrap(),
            options(&dir, &["project_structure"]),
        )
        .unwrap();

        let outcome = run.execute().await.unwrap();
        assert!(outcome.is_valid());
        assert_eq!(outcome.report.total(), 1);
        assert_eq!(outcome.report.results[0].validator, "project_structure");
        assert!(outcome.report.metadata.contains_key("durations_ms"));
        assert!(run.monitor().summary("validator.project_structure").is_some());
    }

    #[tokio::test]
    async fn test_emit_json_to_writer() {
        let dir = python_project();
        let run = ValidationRun::new(
            Config::default(),
            builtin_registry().unwrap(),
            RunOptions {
                format: Some(ReportFormat::Json),
                ..options(&dir, &["project_structure"])
            },
        )
        .unwrap();
        let outcome = run.execute().await.unwrap();

        let mut buf = Vec::new();
        run.emit(&outcome, &mut buf).unwrap();
        let doc: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(doc["summary"]["total_validations"], 1);
        assert_eq!(doc["results"][0]["is_valid"], true);
    }

    #[tokio::test]
    async fn test_emit_to_output_file() {
        let dir = python_project();
        let out_path = dir.path().join("report.html");
        let run = ValidationRun::new(
            Config::default(),
            builtin_registry().unwrap(),
            RunOptions {
                format: Some(ReportFormat::Html),
                output: Some(out_path.clone()),
                ..options(&dir, &["project_structure"])
            },
        )
        .unwrap();
        let outcome = run.execute().await.unwrap();

        let mut buf = Vec::new();
        run.emit(&outcome, &mut buf).unwrap();
        assert!(buf.is_empty());
        let html = std::fs::read_to_string(&out_path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
