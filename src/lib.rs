//! Devsetup - development environment validation
//!
//! Devsetup checks that a Python project workspace is ready for development:
//! interpreter version, virtual environment, project layout, toolchain and
//! environment variables. Checks are `Validator`s looked up by name in a
//! `ValidatorRegistry`, run together by a `CompositeValidator` and rendered
//! as console, JSON or HTML reports.

pub mod checks;
pub mod config;
pub mod error;
pub mod perf;
pub mod report;
pub mod runner;
pub mod validation;

pub use error::{DevsetupError, Result};
