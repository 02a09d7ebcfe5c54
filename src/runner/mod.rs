//! Validation run orchestration.
//!
//! Ties configuration, the validator registry, the composite validator and
//! the reporters together for one `devsetup check` invocation.

mod validation_run;

pub use validation_run::{RunOptions, RunOutcome, ValidationRun};
