//! Core validation interfaces

use std::sync::Arc;

use async_trait::async_trait;

use super::cache::ResultCache;
use super::context::ValidationContext;
use super::result::ValidationResult;
use crate::error::Result;

/// One validation concern over a workspace.
///
/// Implementors provide `name` and `perform_validation`. Callers go through
/// `validate`, which serves a cached result when the validator exposes a
/// cache, the context allows caching and an entry for the same context is
/// younger than the cache TTL. Errors from `perform_validation` are returned
/// as-is and never cached.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Unique name, used as registry key and cache key prefix
    fn name(&self) -> &str;

    /// Get a description of what this validator checks
    fn description(&self) -> &str {
        "validator"
    }

    /// Run the check without consulting the cache
    async fn perform_validation(&self, ctx: &ValidationContext) -> Result<ValidationResult>;

    /// Result cache owned by this validator, if any
    fn cache(&self) -> Option<&ResultCache> {
        None
    }

    /// Cached entry point
    async fn validate(&self, ctx: &ValidationContext) -> Result<Arc<ValidationResult>> {
        let cache = match self.cache() {
            Some(cache) if ctx.cache_enabled => cache,
            _ => return Ok(Arc::new(self.perform_validation(ctx).await?)),
        };

        let key = ctx.cache_key(self.name());
        if let Some(hit) = cache.get(&key) {
            tracing::debug!(validator = self.name(), "Serving cached validation result");
            return Ok(hit);
        }

        let result = Arc::new(self.perform_validation(ctx).await?);
        cache.insert(key, Arc::clone(&result));
        Ok(result)
    }

    /// Shorthand for `validate(ctx).is_valid()`
    async fn is_valid(&self, ctx: &ValidationContext) -> Result<bool> {
        Ok(self.validate(ctx).await?.is_valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DevsetupError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // Mock validator counting how often the real check runs
    struct CountingValidator {
        runs: AtomicUsize,
        cache: ResultCache,
        fail: bool,
    }

    impl CountingValidator {
        fn new(ttl: Duration) -> Self {
            Self {
                runs: AtomicUsize::new(0),
                cache: ResultCache::with_ttl(ttl),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(Duration::from_secs(300))
            }
        }

        fn runs(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Validator for CountingValidator {
        fn name(&self) -> &str {
            "counting"
        }

        async fn perform_validation(&self, _ctx: &ValidationContext) -> Result<ValidationResult> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DevsetupError::ValidationFailed("boom".to_string()));
            }
            Ok(ValidationResult::valid("ok"))
        }

        fn cache(&self) -> Option<&ResultCache> {
            Some(&self.cache)
        }
    }

    struct UncachedValidator;

    #[async_trait]
    impl Validator for UncachedValidator {
        fn name(&self) -> &str {
            "uncached"
        }

        async fn perform_validation(&self, _ctx: &ValidationContext) -> Result<ValidationResult> {
            Ok(ValidationResult::error("bad", vec!["missing file".to_string()]))
        }
    }

    #[tokio::test]
    async fn test_cached_result_is_same_instance() {
        let validator = CountingValidator::new(Duration::from_secs(300));
        let ctx = ValidationContext::new("/proj");

        let first = validator.validate(&ctx).await.unwrap();
        let second = validator.validate(&ctx).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(validator.runs(), 1);
    }

    #[tokio::test]
    async fn test_cache_expires_after_ttl() {
        let validator = CountingValidator::new(Duration::from_millis(20));
        let ctx = ValidationContext::new("/proj");

        let first = validator.validate(&ctx).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = validator.validate(&ctx).await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(validator.runs(), 2);
    }

    #[tokio::test]
    async fn test_context_change_recomputes() {
        let validator = CountingValidator::new(Duration::from_secs(300));

        validator.validate(&ValidationContext::new("/proj")).await.unwrap();
        validator.validate(&ValidationContext::new("/other")).await.unwrap();
        validator
            .validate(&ValidationContext::new("/proj").with_env("PATH", "/bin"))
            .await
            .unwrap();
        validator
            .validate(&ValidationContext::new("/proj").with_config("python", "x"))
            .await
            .unwrap();

        assert_eq!(validator.runs(), 4);
    }

    #[tokio::test]
    async fn test_cache_disabled_in_context() {
        let validator = CountingValidator::new(Duration::from_secs(300));
        let ctx = ValidationContext::new("/proj").with_cache(false);

        validator.validate(&ctx).await.unwrap();
        validator.validate(&ctx).await.unwrap();

        assert_eq!(validator.runs(), 2);
        assert!(validator.cache.is_empty());
    }

    #[tokio::test]
    async fn test_errors_propagate_and_are_not_cached() {
        let validator = CountingValidator::failing();
        let ctx = ValidationContext::new("/proj");

        assert!(validator.validate(&ctx).await.is_err());
        assert!(validator.validate(&ctx).await.is_err());
        assert_eq!(validator.runs(), 2);
    }

    #[tokio::test]
    async fn test_is_valid_shorthand() {
        let ctx = ValidationContext::new("/proj");
        assert!(CountingValidator::new(Duration::from_secs(1)).is_valid(&ctx).await.unwrap());
        assert!(!UncachedValidator.is_valid(&ctx).await.unwrap());
    }

    #[test]
    fn test_default_description_and_cache() {
        assert_eq!(UncachedValidator.description(), "validator");
        assert!(UncachedValidator.cache().is_none());
    }
}
