use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{CreateError, Result};
use crate::install::download::{DownloadLimits, RELEASE_DOWNLOAD_URL, RELEASE_VERSION, ReleaseCatalog};
use crate::install::environment::HostEnv;

/// Overrides `download_timeout_secs`
pub const DOWNLOAD_TIMEOUT_ENV: &str = "FORGO_CREATE_DOWNLOAD_TIMEOUT";
/// Overrides `install_root`
pub const INSTALL_ROOT_ENV: &str = "FORGO_CREATE_INSTALL_ROOT";

/// Directory under home that holds `bin/`, `download/` and `templates/`
pub const DEFAULT_INSTALL_DIR: &str = ".boilerplate";

/// User configuration (`~/.config/forgo-create/config.toml`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateConfig {
    /// Installation root; defaults to `<home>/.boilerplate`
    pub install_root: Option<PathBuf>,
    pub release_version: String,
    pub release_base_url: String,
    pub download_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Register `bin/` on PATH after install
    pub update_path: bool,
    /// Type tag → template URL or directory
    pub templates: HashMap<String, String>,
}

impl Default for CreateConfig {
    fn default() -> Self {
        Self {
            install_root: None,
            release_version: RELEASE_VERSION.to_string(),
            release_base_url: RELEASE_DOWNLOAD_URL.to_string(),
            download_timeout_secs: 300,
            connect_timeout_secs: 30,
            update_path: true,
            templates: HashMap::new(),
        }
    }
}

impl CreateConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("forgo-create").join("config.toml"))
    }

    /// Load from `explicit`, or from the default location when it exists,
    /// then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CreateError::fs("read config", path, e))?;
        debug!("Using config from: {}", path.display());
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| CreateError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |message: String| CreateError::Config {
            path: path.to_path_buf(),
            message,
        };

        let base = url::Url::parse(&self.release_base_url)
            .map_err(|e| invalid(format!("release_base_url '{}': {e}", self.release_base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "release_base_url must be http(s), got '{}'",
                base.scheme()
            )));
        }

        let version = self.release_version.trim();
        if version.is_empty() || version.contains('/') {
            return Err(invalid(format!(
                "release_version '{}' is not a release tag",
                self.release_version
            )));
        }

        if self.download_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(invalid("timeouts must be at least 1 second".to_string()));
        }

        Ok(())
    }

    /// Apply `FORGO_CREATE_*` overrides; unparsable values are ignored with a warning
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(DOWNLOAD_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.download_timeout_secs = secs,
                _ => warn!("Ignoring {DOWNLOAD_TIMEOUT_ENV}={raw}: expected seconds > 0"),
            }
        }

        if let Some(root) = lookup(INSTALL_ROOT_ENV).filter(|v| !v.trim().is_empty()) {
            self.install_root = Some(PathBuf::from(root));
        }
    }

    pub fn download_limits(&self) -> DownloadLimits {
        DownloadLimits {
            connect: Duration::from_secs(self.connect_timeout_secs),
            total: Duration::from_secs(self.download_timeout_secs),
        }
    }

    /// Release URL table for the configured version, built once per run
    pub fn catalog(&self) -> ReleaseCatalog {
        ReleaseCatalog::new(&self.release_base_url, self.release_version.trim())
    }

    /// Configured root, else `<home>/.boilerplate`
    pub fn install_root(&self, env: &HostEnv) -> Result<PathBuf> {
        if let Some(root) = &self.install_root {
            return Ok(root.clone());
        }

        env.home_dir()
            .or_else(dirs::home_dir)
            .map(|home| home.join(DEFAULT_INSTALL_DIR))
            .ok_or(CreateError::NoHomeDirectory)
    }

    /// Template for a type tag; defaults to `<root>/templates/<tag>`
    pub fn template_for(&self, tag: &str, install_root: &Path) -> String {
        self.templates.get(tag).cloned().unwrap_or_else(|| {
            install_root
                .join("templates")
                .join(tag)
                .display()
                .to_string()
        })
    }
}
