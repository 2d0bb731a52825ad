//! Installation state detection
//!
//! Decides whether the managed boilerplate binary must be (re)installed:
//! - missing from `bin/` → install
//! - reports a different version → reinstall
//! - otherwise → keep

use std::path::Path;
use std::time::Duration;

use log::{debug, warn};
use tokio::process::Command;

/// How long `boilerplate --version` may take before it is abandoned
pub const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Installation state enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    /// No binary at the install path
    Missing,
    /// Binary present but reports another release
    Outdated { found: String },
    /// Binary present at the expected release
    Current,
}

impl InstallState {
    pub fn needs_install(&self) -> bool {
        !matches!(self, InstallState::Current)
    }
}

/// Check the binary at `installed` against `expected_version`.
///
/// A binary whose version cannot be read in time is trusted as current.
pub async fn check_installation_state(installed: &Path, expected_version: &str) -> InstallState {
    check_installation_state_within(installed, expected_version, VERSION_CHECK_TIMEOUT).await
}

/// [`check_installation_state`] with an explicit limit on `--version`
pub async fn check_installation_state_within(
    installed: &Path,
    expected_version: &str,
    limit: Duration,
) -> InstallState {
    if !installed.is_file() {
        return InstallState::Missing;
    }

    let run = Command::new(installed)
        .arg("--version")
        .kill_on_drop(true)
        .output();

    let found = match tokio::time::timeout(limit, run).await {
        Ok(Ok(output)) if output.status.success() => {
            parse_version_output(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(Ok(output)) => {
            warn!("{} --version exited with {}", installed.display(), output.status);
            None
        }
        Ok(Err(e)) => {
            warn!("Failed to run {} --version: {e}", installed.display());
            None
        }
        Err(_) => {
            warn!(
                "{} --version did not finish within {}s",
                installed.display(),
                limit.as_secs()
            );
            None
        }
    };

    classify(found.as_deref(), expected_version)
}

/// Compare a reported version with the pinned one
pub fn classify(found: Option<&str>, expected_version: &str) -> InstallState {
    match found {
        Some(found) if normalize(found) != normalize(expected_version) => InstallState::Outdated {
            found: found.to_string(),
        },
        Some(_) => InstallState::Current,
        None => {
            debug!("Installed version unknown, assuming {expected_version}");
            InstallState::Current
        }
    }
}

/// Pull the version token out of `boilerplate --version` output
/// (`boilerplate version v0.5.12`)
pub fn parse_version_output(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .find(|token| {
            let digits = token.strip_prefix('v').unwrap_or(token);
            digits.starts_with(|c: char| c.is_ascii_digit()) && digits.contains('.')
        })
        .map(str::to_string)
}

fn normalize(version: &str) -> &str {
    let version = version.trim();
    version.strip_prefix('v').unwrap_or(version)
}
