// Validation framework
// Validators, their cached entry point, a name-keyed registry and the composite that runs them together

pub mod cache;
pub mod composite;
pub mod context;
pub mod registry;
pub mod result;
pub mod retry;
pub mod traits;

pub use cache::{DEFAULT_CACHE_TTL, ResultCache};
pub use composite::{ALL_PASSED_MESSAGE, CompositeSummary, CompositeValidator};
pub use context::ValidationContext;
pub use registry::{RegisteredValidator, RegistryEntry, ValidatorFactory, ValidatorRegistry};
pub use result::{ValidationResult, ValidationStatus};
pub use retry::RetryingValidator;
pub use traits::Validator;
