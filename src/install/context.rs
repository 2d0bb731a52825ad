//! Installation context with directory layout and download parameters

use std::fs;
use std::path::PathBuf;

use crate::config::CreateConfig;
use crate::error::{CreateError, Result};

use super::binaries::binary_file_name;
use super::download::{DownloadLimits, Platform, ReleaseCatalog};
use super::environment::HostEnv;

/// Everything one install needs, resolved up front
#[derive(Debug, Clone)]
pub struct InstallContext {
    pub platform: Platform,
    pub version: String,
    pub url: String,
    pub root: PathBuf,
    pub bin_dir: PathBuf,
    pub download_dir: PathBuf,
    pub staged_binary: PathBuf,
    pub installed_binary: PathBuf,
    pub limits: DownloadLimits,
    pub update_path: bool,
}

impl InstallContext {
    pub fn new(
        config: &CreateConfig,
        env: &HostEnv,
        platform: Platform,
        catalog: &ReleaseCatalog,
    ) -> Result<Self> {
        let url = catalog.url_for(platform)?.to_string();
        let root = config.install_root(env)?;
        let bin_dir = root.join("bin");
        let download_dir = root.join("download");
        let binary = binary_file_name(platform);

        Ok(Self {
            platform,
            version: catalog.version().to_string(),
            url,
            staged_binary: download_dir.join(binary),
            installed_binary: bin_dir.join(binary),
            root,
            bin_dir,
            download_dir,
            limits: config.download_limits(),
            update_path: config.update_path,
        })
    }

    /// Create `bin/` and `download/` (and the root) if missing
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.bin_dir, &self.download_dir] {
            fs::create_dir_all(dir).map_err(|e| CreateError::fs("create directory", dir, e))?;
        }
        Ok(())
    }
}
