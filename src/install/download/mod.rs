//! Boilerplate release download
//!
//! ## Module Organization
//!
//! - `platform` - Host platform detection against the supported release set
//! - `release` - Precomputed release asset URLs per platform
//! - `core` - Streaming download into the staging directory

mod core;
mod platform;
mod release;

pub use self::core::{DownloadLimits, build_client, download_to_staging};
pub use platform::{Arch, Os, Platform, SUPPORTED_PLATFORMS, detect, resolve_platform};
pub use release::{RELEASE_DOWNLOAD_URL, RELEASE_VERSION, ReleaseCatalog};
