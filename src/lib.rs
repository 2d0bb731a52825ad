//! Create new projects from boilerplate templates.
//!
//! Validates the requested artifact name and type, installs the matching
//! [boilerplate](https://github.com/gruntwork-io/boilerplate) release for the
//! host on first use, and runs it.

pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod install;
pub mod runners;
pub mod validation;

pub use cli::{Args, CreateOptions, CreateType};
pub use config::CreateConfig;
pub use error::{CreateError, Result};
pub use validation::{ValidationResult, validate_name, validate_type};
