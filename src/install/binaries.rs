//! Canonical name of the managed boilerplate binary

use super::download::{Os, Platform};

/// File stem shared by every release asset and installed binary
pub const BINARY_STEM: &str = "boilerplate";

/// Installed file name for `platform`: `boilerplate`, or `boilerplate.exe` on Windows
pub fn binary_file_name(platform: Platform) -> &'static str {
    match platform.os {
        Os::Windows => "boilerplate.exe",
        Os::Darwin | Os::Linux => BINARY_STEM,
    }
}
