//! Opt-in retry wrapper for flaky validators

use std::time::Duration;

use async_trait::async_trait;

use super::cache::ResultCache;
use super::context::ValidationContext;
use super::result::ValidationResult;
use super::traits::Validator;
use crate::error::Result;

/// Retries `perform_validation` of the wrapped validator when it errors.
///
/// Only `Err` triggers a retry; a result reporting invalid is returned
/// immediately. The wrapper shares the inner validator's name and cache.
pub struct RetryingValidator<V> {
    inner: V,
    max_attempts: u32,
    delay: Duration,
}

impl<V: Validator> RetryingValidator<V> {
    /// Wrap a validator; `max_attempts` is clamped to at least one
    pub fn new(inner: V, max_attempts: u32) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            delay: Duration::from_millis(500),
        }
    }

    /// Set the pause between attempts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn inner(&self) -> &V {
        &self.inner
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[async_trait]
impl<V: Validator> Validator for RetryingValidator<V> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn cache(&self) -> Option<&ResultCache> {
        self.inner.cache()
    }

    async fn perform_validation(&self, ctx: &ValidationContext) -> Result<ValidationResult> {
        let mut attempt = 1;
        loop {
            match self.inner.perform_validation(ctx).await {
                Ok(result) => return Ok(result.with_metadata("attempts", attempt)),
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        validator = self.inner.name(),
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Validation attempt failed, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
