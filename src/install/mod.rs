//! Boilerplate binary installation
//!
//! Resolves the host platform, downloads the matching boilerplate release
//! into `<root>/download/`, promotes it into `<root>/bin/` and registers
//! that directory on PATH.

pub mod binaries;
pub mod binary_staging;
pub mod context;
pub mod detection;
pub mod download;
pub mod environment;
pub mod orchestration;
pub mod path;

// Public exports
pub use context::InstallContext;
pub use detection::{InstallState, check_installation_state};
pub use environment::{HostEnv, Shell};
pub use orchestration::{InstallOutcome, Provisioned, ensure_installed, install, planned_actions};
pub use path::{PathPlan, PathUpdate};
