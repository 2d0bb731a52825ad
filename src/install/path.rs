//! PATH registration for the installed `bin` directory
//!
//! Split into a pure [`plan_windows`]/[`plan_profile`] decision and an
//! effectful [`apply`]. Nothing here is fatal: every failure degrades to
//! [`PathUpdate::Manual`] with instructions for the user.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info, warn};

use super::download::Os;
use super::environment::{HostEnv, Shell};

/// Longest persistent PATH `setx` can write without truncating it
pub const WINDOWS_PATH_LIMIT: usize = 2047;

/// What should happen to make `dir` reachable from new shells
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPlan {
    /// Persist a new user PATH value via `setx`
    SetWindowsPath { value: String },
    /// Append `line` to the shell profile
    AppendProfile { profile: PathBuf, line: String },
    /// The directory is already registered
    AlreadyPresent { target: String },
    /// Automatic registration refused; the user must do it
    Manual { dir: PathBuf, reason: String },
}

/// Result of applying a [`PathPlan`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathUpdate {
    Updated { target: String },
    AlreadyPresent { target: String },
    Manual { dir: PathBuf, reason: String },
    /// PATH updates were turned off
    Skipped,
}

impl PathUpdate {
    pub fn needs_manual_setup(&self) -> bool {
        matches!(self, PathUpdate::Manual { .. })
    }
}

/// Forward-slash form used in profile lines and containment checks
pub fn normalize_dir(dir: &Path) -> String {
    dir.display().to_string().replace('\\', "/")
}

/// Decide how to register `dir` on Windows.
///
/// `user_path` is the persistent user-scope value and is the only thing
/// written back; `process_path` (machine and user joined) only suppresses
/// the change when `dir` is already reachable.
pub fn plan_windows(user_path: &str, process_path: Option<&str>, dir: &Path) -> PathPlan {
    let dir_str = dir.display().to_string();
    let wanted = dir_str.trim_end_matches(['\\', '/']);

    let has_entry = |value: &str| {
        value
            .split(';')
            .any(|entry| entry.trim_end_matches(['\\', '/']).eq_ignore_ascii_case(wanted))
    };
    if has_entry(user_path) || process_path.is_some_and(has_entry) {
        return PathPlan::AlreadyPresent {
            target: "user PATH".to_string(),
        };
    }

    // +1 for the separator joining the two
    if user_path.len() + 1 + dir_str.len() > WINDOWS_PATH_LIMIT {
        return PathPlan::Manual {
            dir: dir.to_path_buf(),
            reason: format!(
                "user PATH is too long ({} characters); adding '{}' could truncate it",
                user_path.len(),
                dir_str
            ),
        };
    }

    let current = user_path.trim_end_matches(';');
    let value = if current.is_empty() {
        dir_str
    } else {
        format!("{current};{dir_str}")
    };
    PathPlan::SetWindowsPath { value }
}

/// Whether a non-comment line of `content` lists `dir` as a whole PATH entry.
///
/// Entries are split on `:`, whitespace, quotes and `=`, so
/// `export PATH="$PATH:/x/bin"` and `set -gx PATH $PATH /x/bin` both match
/// `/x/bin` while `/x/bin-old` does not.
pub fn profile_has_entry(content: &str, dir: &Path) -> bool {
    let raw = dir.display().to_string();
    let normalized = normalize_dir(dir);
    let wanted = [
        raw.trim_end_matches(['/', '\\']),
        normalized.trim_end_matches('/'),
    ];

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .flat_map(|line| {
            line.split(|c: char| c == ':' || c == '"' || c == '\'' || c == '=' || c.is_whitespace())
        })
        .map(|entry| entry.trim_end_matches('/'))
        .any(|entry| !entry.is_empty() && wanted.contains(&entry))
}

/// Decide how to register `dir` in a Unix shell profile.
///
/// `existing` is the current profile content, `None` if the file is absent.
pub fn plan_profile(shell: Shell, home: &Path, dir: &Path, existing: Option<&str>) -> PathPlan {
    let normalized = normalize_dir(dir);

    let (Some(profile), Some(line)) = (shell.profile_path(home), shell.export_line(&normalized))
    else {
        return PathPlan::Manual {
            dir: dir.to_path_buf(),
            reason: "could not determine your shell from SHELL".to_string(),
        };
    };

    if existing.is_some_and(|content| profile_has_entry(content, dir)) {
        return PathPlan::AlreadyPresent {
            target: profile.display().to_string(),
        };
    }

    PathPlan::AppendProfile { profile, line }
}

/// Read the environment and profile, then plan the PATH registration for `os`.
pub fn plan_path_update(os: Os, env: &HostEnv, dir: &Path) -> PathPlan {
    if os == Os::Windows {
        let Some(user_path) = env.user_path.as_deref() else {
            return PathPlan::Manual {
                dir: dir.to_path_buf(),
                reason: "could not read the user PATH".to_string(),
            };
        };
        return plan_windows(user_path, env.path.as_deref(), dir);
    }

    let Some(home) = env.home_dir() else {
        return PathPlan::Manual {
            dir: dir.to_path_buf(),
            reason: "HOME is not set".to_string(),
        };
    };

    let shell = env.shell();
    debug!("Detected shell: {}", shell.name());
    let Some(profile) = shell.profile_path(&home) else {
        return plan_profile(shell, &home, dir, None);
    };

    // Profiles are not always UTF-8; an unreadable one is never appended to blind
    let existing = match fs::read(&profile) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            return PathPlan::Manual {
                dir: dir.to_path_buf(),
                reason: format!("failed to read {}: {e}", profile.display()),
            };
        }
    };
    plan_profile(shell, &home, dir, existing.as_deref())
}

/// Carry out `plan`, degrading any failure to [`PathUpdate::Manual`]
pub fn apply(plan: PathPlan, dir: &Path) -> PathUpdate {
    match plan {
        PathPlan::AlreadyPresent { target } => {
            info!("{} already on PATH via {target}", dir.display());
            PathUpdate::AlreadyPresent { target }
        }
        PathPlan::Manual { dir, reason } => {
            warn!("Not updating PATH: {reason}");
            PathUpdate::Manual { dir, reason }
        }
        PathPlan::AppendProfile { profile, line } => match append_line(&profile, &line) {
            Ok(()) => {
                info!("Added {} to PATH in {}", dir.display(), profile.display());
                PathUpdate::Updated {
                    target: profile.display().to_string(),
                }
            }
            Err(e) => {
                warn!("Failed to update {}: {e}", profile.display());
                PathUpdate::Manual {
                    dir: dir.to_path_buf(),
                    reason: format!("failed to update {}: {e}", profile.display()),
                }
            }
        },
        PathPlan::SetWindowsPath { value } => match set_windows_path(&value) {
            Ok(()) => {
                info!("Added {} to the user PATH", dir.display());
                PathUpdate::Updated {
                    target: "user PATH".to_string(),
                }
            }
            Err(reason) => {
                warn!("Failed to update user PATH: {reason}");
                PathUpdate::Manual {
                    dir: dir.to_path_buf(),
                    reason,
                }
            }
        },
    }
}

/// Plan and apply in one step
pub fn register_bin_dir(os: Os, env: &HostEnv, dir: &Path) -> PathUpdate {
    apply(plan_path_update(os, env, dir), dir)
}

fn append_line(profile: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = profile.parent() {
        fs::create_dir_all(parent)?;
    }

    let needs_newline = fs::read(profile)
        .map(|bytes| bytes.last().is_some_and(|b| *b != b'\n'))
        .unwrap_or(false);

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(profile)?;
    if needs_newline {
        writeln!(file)?;
    }
    writeln!(file, "{line}")?;
    file.sync_all()
}

fn set_windows_path(value: &str) -> Result<(), String> {
    let output = Command::new("setx")
        .arg("Path")
        .arg(value)
        .output()
        .map_err(|e| format!("failed to run setx: {e}"))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(format!(
            "setx exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unix_env(home: &Path, shell: &str) -> HostEnv {
        HostEnv {
            home: Some(home.display().to_string()),
            shell: Some(shell.to_string()),
            ..HostEnv::default()
        }
    }

    #[test]
    fn windows_refuses_when_too_long() {
        let current = "C:\\x;".repeat(450);
        let dir = Path::new("C:\\Users\\dev\\.boilerplate\\bin");
        let plan = plan_windows(&current, None, dir);
        assert!(matches!(plan, PathPlan::Manual { .. }), "{plan:?}");
    }

    #[test]
    fn windows_appends_when_short() {
        let dir = Path::new("C:\\Users\\dev\\.boilerplate\\bin");
        let plan = plan_windows("C:\\Windows;C:\\Tools", None, dir);
        assert_eq!(
            plan,
            PathPlan::SetWindowsPath {
                value: "C:\\Windows;C:\\Tools;C:\\Users\\dev\\.boilerplate\\bin".to_string()
            }
        );
    }

    #[test]
    fn windows_missing_path_uses_dir_alone() {
        let dir = Path::new("C:\\b");
        assert_eq!(
            plan_windows("", None, dir),
            PathPlan::SetWindowsPath {
                value: "C:\\b".to_string()
            }
        );
    }

    #[test]
    fn windows_threshold_counts_both_lengths() {
        let dir = Path::new("D:\\bin"); // 6 chars
        let at_limit = "a".repeat(WINDOWS_PATH_LIMIT - 7);
        assert!(matches!(
            plan_windows(&at_limit, None, dir),
            PathPlan::SetWindowsPath { .. }
        ));
        let over = "a".repeat(WINDOWS_PATH_LIMIT - 6);
        assert!(matches!(plan_windows(&over, None, dir), PathPlan::Manual { .. }));
    }

    #[test]
    fn windows_skips_existing_entry() {
        let dir = Path::new("C:\\b\\bin");
        let plan = plan_windows("C:\\Windows;c:\\B\\bin\\", None, dir);
        assert!(matches!(plan, PathPlan::AlreadyPresent { .. }));
    }

    #[test]
    fn windows_writes_only_the_user_scope() {
        let dir = Path::new("C:\\Users\\dev\\.boilerplate\\bin");
        let process = "C:\\Windows;C:\\Windows\\System32;C:\\Users\\dev\\tools";
        let plan = plan_windows("C:\\Users\\dev\\tools", Some(process), dir);
        assert_eq!(
            plan,
            PathPlan::SetWindowsPath {
                value: "C:\\Users\\dev\\tools;C:\\Users\\dev\\.boilerplate\\bin".to_string()
            }
        );
    }

    #[test]
    fn windows_threshold_ignores_machine_entries() {
        let dir = Path::new("D:\\bin");
        let machine = "M".repeat(WINDOWS_PATH_LIMIT);
        let plan = plan_windows("C:\\u", Some(&format!("{machine};C:\\u")), dir);
        assert!(matches!(plan, PathPlan::SetWindowsPath { .. }), "{plan:?}");
    }

    #[test]
    fn windows_entry_in_process_path_is_enough() {
        let dir = Path::new("C:\\b\\bin");
        let plan = plan_windows("", Some("C:\\Windows;C:\\b\\bin"), dir);
        assert!(matches!(plan, PathPlan::AlreadyPresent { .. }));
    }

    #[test]
    fn windows_unreadable_user_path_is_manual() {
        let env = HostEnv {
            path: Some("C:\\Windows".into()),
            user_path: None,
            ..HostEnv::default()
        };
        let update = register_bin_dir(Os::Windows, &env, Path::new("C:\\b\\bin"));
        assert!(update.needs_manual_setup(), "{update:?}");
    }

    #[test]
    fn unknown_shell_asks_for_manual_setup() {
        let bin = Path::new("/home/dev/.boilerplate/bin");
        let plan = plan_profile(Shell::Unknown, Path::new("/home/dev"), bin, None);
        match plan {
            PathPlan::Manual { dir, .. } => assert_eq!(dir, bin),
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn profile_with_entry_is_left_alone() {
        let existing = "alias ll='ls -l'\nexport PATH=\"$PATH:/home/dev/.boilerplate/bin\"\n";
        let plan = plan_profile(
            Shell::Zsh,
            Path::new("/home/dev"),
            Path::new("/home/dev/.boilerplate/bin"),
            Some(existing),
        );
        assert!(matches!(plan, PathPlan::AlreadyPresent { .. }));
    }

    #[test]
    fn similar_directories_do_not_count() {
        let bin = Path::new("/home/dev/.boilerplate/bin");
        for existing in [
            "export PATH=\"$PATH:/home/dev/.boilerplate/bin-old\"\n",
            "export PATH=\"$PATH:/home/dev/.boilerplate/bin2\"\n",
            "# export PATH=\"$PATH:/home/dev/.boilerplate/bin\"\n",
        ] {
            let plan = plan_profile(Shell::Bash, Path::new("/home/dev"), bin, Some(existing));
            assert!(matches!(plan, PathPlan::AppendProfile { .. }), "{existing}: {plan:?}");
        }
    }

    #[test]
    fn entry_found_in_fish_and_multi_entry_lines() {
        let bin = Path::new("/home/dev/.boilerplate/bin");
        assert!(profile_has_entry("set -gx PATH $PATH /home/dev/.boilerplate/bin\n", bin));
        assert!(profile_has_entry(
            "export PATH=/usr/local/bin:/home/dev/.boilerplate/bin/:$PATH\n",
            bin
        ));
    }

    #[test]
    fn non_utf8_profile_is_appended_once() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path();
        let bin = home.join(".boilerplate").join("bin");
        let profile = home.join(".bashrc");
        fs::write(&profile, b"# caf\xe9 latin-1 comment\n").unwrap();

        let env = unix_env(home, "/bin/bash");
        let first = register_bin_dir(Os::Linux, &env, &bin);
        let second = register_bin_dir(Os::Linux, &env, &bin);

        assert!(matches!(first, PathUpdate::Updated { .. }), "{first:?}");
        assert!(matches!(second, PathUpdate::AlreadyPresent { .. }), "{second:?}");

        let bytes = fs::read(&profile).unwrap();
        assert!(bytes.starts_with(b"# caf\xe9 latin-1 comment\n"));
        let content = String::from_utf8_lossy(&bytes);
        assert_eq!(content.matches(&normalize_dir(&bin)).count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_profile_is_manual() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path();
        // a directory where the profile should be cannot be read as a file
        fs::create_dir(home.join(".zshrc")).unwrap();

        let update = register_bin_dir(Os::Linux, &unix_env(home, "/bin/zsh"), &home.join("bin"));
        assert!(update.needs_manual_setup(), "{update:?}");
    }

    #[test]
    fn appending_twice_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path();
        let bin = home.join(".boilerplate").join("bin");
        let profile = home.join(".bashrc");
        fs::write(&profile, "# existing config").unwrap();

        let env = unix_env(home, "/bin/bash");
        let first = register_bin_dir(Os::Linux, &env, &bin);
        let second = register_bin_dir(Os::Linux, &env, &bin);

        assert!(matches!(first, PathUpdate::Updated { .. }), "{first:?}");
        assert!(matches!(second, PathUpdate::AlreadyPresent { .. }), "{second:?}");

        let content = fs::read_to_string(&profile).unwrap();
        assert_eq!(content.matches(&normalize_dir(&bin)).count(), 1);
        assert!(content.starts_with("# existing config\n"));
    }

    #[test]
    fn fish_profile_is_created_with_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path();
        let bin = home.join(".boilerplate").join("bin");

        let update = register_bin_dir(Os::Darwin, &unix_env(home, "/opt/homebrew/bin/fish"), &bin);
        assert!(matches!(update, PathUpdate::Updated { .. }));

        let content = fs::read_to_string(home.join(".config/fish/config.fish")).unwrap();
        assert_eq!(content, format!("set -gx PATH $PATH {}\n", normalize_dir(&bin)));
    }

    #[test]
    fn missing_home_is_manual() {
        let env = HostEnv {
            shell: Some("/bin/zsh".into()),
            ..HostEnv::default()
        };
        let update = register_bin_dir(Os::Linux, &env, Path::new("/x/bin"));
        assert!(update.needs_manual_setup());
    }
}
