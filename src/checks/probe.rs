//! External tool probing
//!
//! Runs a program with a hard timeout, inside the workspace and with the
//! context environment applied.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{DevsetupError, Result};
use crate::validation::ValidationContext;

/// Captured output of a finished probe
#[derive(Debug, Clone)]
pub struct ProbeOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProbeOutput {
    /// First non-empty line of stdout, falling back to stderr
    pub fn first_line(&self) -> Option<&str> {
        first_non_empty(&self.stdout).or_else(|| first_non_empty(&self.stderr))
    }
}

fn first_non_empty(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    /// The program ran to completion (with any exit code)
    Completed(ProbeOutput),
    /// The program could not be found
    NotFound,
    /// The program did not finish within the timeout and was killed
    TimedOut,
}

/// Run `program args...` for `ctx`.
///
/// Spawn failures other than a missing program are returned as
/// `DevsetupError::Probe`.
pub async fn run_probe(program: &str, args: &[&str], ctx: &ValidationContext, timeout: Duration) -> Result<ProbeOutcome> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if ctx.workspace_root().is_dir() {
        cmd.current_dir(ctx.workspace_root());
    }
    cmd.envs(&ctx.environment);
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(program, "Probe target not found");
            return Ok(ProbeOutcome::NotFound);
        }
        Err(e) => return Err(DevsetupError::Probe(format!("Failed to run {}: {}", program, e))),
    };

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(ProbeOutcome::Completed(ProbeOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })),
        Ok(Err(e)) => Err(DevsetupError::Probe(format!("Failed waiting for {}: {}", program, e))),
        Err(_) => {
            tracing::warn!(program, timeout_ms = timeout.as_millis() as u64, "Probe timed out");
            Ok(ProbeOutcome::TimedOut)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn completed(outcome: ProbeOutcome) -> ProbeOutput {
        match outcome {
            ProbeOutcome::Completed(output) => output,
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_success() {
        let ctx = ValidationContext::new(std::env::temp_dir());
        let output = completed(
            run_probe("sh", &["-c", "echo hello"], &ctx, Duration::from_secs(5))
                .await
                .unwrap(),
        );
        assert!(output.success);
        assert_eq!(output.code, Some(0));
        assert_eq!(output.first_line(), Some("hello"));
    }

    #[tokio::test]
    async fn test_probe_nonzero_exit() {
        let ctx = ValidationContext::new(std::env::temp_dir());
        let output = completed(
            run_probe("sh", &["-c", "echo oops >&2; exit 3"], &ctx, Duration::from_secs(5))
                .await
                .unwrap(),
        );
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.first_line(), Some("oops"));
    }

    #[tokio::test]
    async fn test_probe_missing_program() {
        let ctx = ValidationContext::new(std::env::temp_dir());
        let outcome = run_probe("devsetup-no-such-tool-xyz", &[], &ctx, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(matches!(outcome, ProbeOutcome::NotFound));
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let ctx = ValidationContext::new(std::env::temp_dir());
        let outcome = run_probe("sh", &["-c", "sleep 5"], &ctx, Duration::from_millis(100))
            .await
            .unwrap();
        assert!(matches!(outcome, ProbeOutcome::TimedOut));
    }

    #[tokio::test]
    async fn test_probe_uses_context_env_and_workspace() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let ctx = ValidationContext::new(dir.path()).with_env("DEVSETUP_PROBE", "visible");

        let output = completed(
            run_probe("sh", &["-c", "ls marker.txt && echo $DEVSETUP_PROBE"], &ctx, Duration::from_secs(5))
                .await
                .unwrap(),
        );
        assert!(output.stdout.contains("marker.txt"));
        assert!(output.stdout.contains("visible"));
    }

    #[test]
    fn test_first_line_skips_blank() {
        let output = ProbeOutput {
            success: true,
            code: Some(0),
            stdout: "\n\n  Python 3.12.1  \n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(output.first_line(), Some("Python 3.12.1"));
    }
}
