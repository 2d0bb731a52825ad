//! Release asset catalog: one download URL per supported platform

use std::collections::HashMap;

use crate::error::{CreateError, Result};

use super::platform::{Os, Platform, SUPPORTED_PLATFORMS};

/// Upstream location of boilerplate release assets
pub const RELEASE_DOWNLOAD_URL: &str =
    "https://github.com/gruntwork-io/boilerplate/releases/download";

/// Pinned boilerplate release
pub const RELEASE_VERSION: &str = "v0.5.12";

/// Immutable platform → URL table, built once at startup
#[derive(Debug, Clone)]
pub struct ReleaseCatalog {
    version: String,
    urls: HashMap<Platform, String>,
}

impl ReleaseCatalog {
    pub fn new(base_url: &str, version: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let urls = SUPPORTED_PLATFORMS
            .iter()
            .map(|platform| (*platform, asset_url(base_url, version, *platform)))
            .collect();

        Self {
            version: version.to_string(),
            urls,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Download URL for `platform`; only members of the supported set have one
    pub fn url_for(&self, platform: Platform) -> Result<&str> {
        self.urls
            .get(&platform)
            .map(String::as_str)
            .ok_or_else(|| CreateError::UnsupportedPlatform {
                os: platform.os.as_str().to_string(),
                arch: platform.arch.as_str().to_string(),
            })
    }

    /// Entries in supported-platform order
    pub fn entries(&self) -> impl Iterator<Item = (Platform, &str)> + '_ {
        SUPPORTED_PLATFORMS
            .iter()
            .filter_map(|p| self.urls.get(p).map(|url| (*p, url.as_str())))
    }
}

impl Default for ReleaseCatalog {
    fn default() -> Self {
        Self::new(RELEASE_DOWNLOAD_URL, RELEASE_VERSION)
    }
}

/// `{base}/{version}/boilerplate_{os}_{arch}`, with `.exe` for Windows assets
fn asset_url(base_url: &str, version: &str, platform: Platform) -> String {
    let suffix = if platform.os == Os::Windows { ".exe" } else { "" };
    format!(
        "{base_url}/{version}/boilerplate_{}_{}{suffix}",
        platform.os.as_str(),
        platform.arch.as_str()
    )
}
