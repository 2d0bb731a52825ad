//! Host environment snapshot and shell detection
//!
//! The four variables the installer consults are read once into a
//! [`HostEnv`]; every decision downstream takes it by reference so the
//! policy can be exercised against synthetic environments.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};

/// Environment variables consulted during install
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnv {
    /// `HOME`
    pub home: Option<String>,
    /// `USERPROFILE` (Windows fallback for home)
    pub user_profile: Option<String>,
    /// `SHELL`
    pub shell: Option<String>,
    /// Process `PATH`; on Windows this is the machine and user values joined
    pub path: Option<String>,
    /// Persistent user-scope `Path` (`HKCU\Environment`), Windows only.
    /// `None` when it could not be read, `Some("")` when the value is unset.
    pub user_path: Option<String>,
}

impl HostEnv {
    pub fn from_process() -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            home: var("HOME"),
            user_profile: var("USERPROFILE"),
            shell: var("SHELL"),
            path: var("PATH"),
            user_path: if cfg!(windows) { read_user_path() } else { None },
        }
    }

    /// `HOME`, falling back to `USERPROFILE`
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.home
            .as_deref()
            .or(self.user_profile.as_deref())
            .map(PathBuf::from)
    }

    pub fn shell(&self) -> Shell {
        Shell::from_env_value(self.shell.as_deref())
    }
}

/// Query the persistent user `Path` through `reg query`
fn read_user_path() -> Option<String> {
    let output = match Command::new("reg")
        .args(["query", "HKCU\\Environment", "/v", "Path"])
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            warn!("Failed to run reg query: {e}");
            return None;
        }
    };

    if !output.status.success() {
        // reg exits non-zero when the value does not exist
        debug!("No user Path value in HKCU\\Environment");
        return Some(String::new());
    }
    parse_reg_query(&String::from_utf8_lossy(&output.stdout))
}

/// Extract the `Path` data from `reg query` output:
///
/// ```text
/// HKEY_CURRENT_USER\Environment
///     Path    REG_EXPAND_SZ    C:\Users\dev\bin;C:\Tools
/// ```
pub fn parse_reg_query(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let line = line.trim_start();
        let (name, rest) = line.split_once(char::is_whitespace)?;
        if !name.eq_ignore_ascii_case("path") {
            return None;
        }
        let rest = rest.trim_start();
        if !rest.starts_with("REG_") {
            return None;
        }
        let value = rest
            .split_once(char::is_whitespace)
            .map(|(_, value)| value.trim())
            .unwrap_or_default();
        Some(value.to_string())
    })
}

/// Shells whose profile we know how to extend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Unknown,
}

impl Shell {
    /// Classify a `SHELL` value by its executable name (`/usr/bin/zsh` → `Zsh`)
    pub fn from_env_value(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Shell::Unknown;
        };

        let name = Path::new(value.trim())
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let name = name.strip_suffix(".exe").unwrap_or(name);

        match name {
            "bash" => Shell::Bash,
            "zsh" => Shell::Zsh,
            "fish" => Shell::Fish,
            _ => Shell::Unknown,
        }
    }

    /// Startup file that should carry the PATH entry
    pub fn profile_path(&self, home: &Path) -> Option<PathBuf> {
        match self {
            Shell::Bash => Some(home.join(".bashrc")),
            Shell::Zsh => Some(home.join(".zshrc")),
            Shell::Fish => Some(home.join(".config").join("fish").join("config.fish")),
            Shell::Unknown => None,
        }
    }

    /// Line that appends `dir` to PATH in this shell's syntax
    pub fn export_line(&self, dir: &str) -> Option<String> {
        match self {
            Shell::Bash | Shell::Zsh => Some(format!("export PATH=\"$PATH:{dir}\"")),
            Shell::Fish => Some(format!("set -gx PATH $PATH {dir}")),
            Shell::Unknown => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
            Shell::Unknown => "unknown",
        }
    }
}
