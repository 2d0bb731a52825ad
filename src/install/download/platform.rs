//! Platform detection for release asset selection

use std::fmt;

use once_cell::sync::OnceCell;

use crate::error::{CreateError, Result};

/// Operating systems boilerplate publishes releases for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Darwin,
    Linux,
    Windows,
}

/// CPU architectures boilerplate publishes releases for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    Amd64,
    Arm64,
    I386,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Darwin => "darwin",
            Os::Linux => "linux",
            Os::Windows => "windows",
        }
    }

    /// Map a raw host identifier (`std::env::consts::OS` spelling) to a release OS
    pub fn from_host(raw: &str) -> Option<Self> {
        match raw {
            "macos" | "darwin" => Some(Os::Darwin),
            "linux" => Some(Os::Linux),
            "windows" => Some(Os::Windows),
            _ => None,
        }
    }
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
            Arch::I386 => "386",
        }
    }

    /// Map a raw host identifier (`std::env::consts::ARCH` spelling) to a release arch
    pub fn from_host(raw: &str) -> Option<Self> {
        match raw {
            "x86_64" | "amd64" => Some(Arch::Amd64),
            "aarch64" | "arm64" => Some(Arch::Arm64),
            "x86" | "i386" | "i686" => Some(Arch::I386),
            _ => None,
        }
    }
}

/// An `(os, arch)` pair with a published release asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_PLATFORMS.contains(self)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os.as_str(), self.arch.as_str())
    }
}

/// Every platform with a known release artifact, in release order
pub const SUPPORTED_PLATFORMS: [Platform; 7] = [
    Platform::new(Os::Darwin, Arch::Amd64),
    Platform::new(Os::Darwin, Arch::Arm64),
    Platform::new(Os::Linux, Arch::I386),
    Platform::new(Os::Linux, Arch::Amd64),
    Platform::new(Os::Linux, Arch::Arm64),
    Platform::new(Os::Windows, Arch::I386),
    Platform::new(Os::Windows, Arch::Amd64),
];

/// Global cache for platform detection (initialized once, used everywhere)
static PLATFORM_CACHE: OnceCell<Platform> = OnceCell::new();

/// Resolve raw host identifiers to a supported platform.
///
/// Unmapped identifiers keep their raw spelling in the error so the user sees
/// exactly which combination is missing (e.g. `linux/arm`).
pub fn resolve_platform(raw_os: &str, raw_arch: &str) -> Result<Platform> {
    let os = Os::from_host(raw_os);
    let arch = Arch::from_host(raw_arch);

    match (os, arch) {
        (Some(os), Some(arch)) if Platform::new(os, arch).is_supported() => {
            Ok(Platform::new(os, arch))
        }
        _ => Err(CreateError::UnsupportedPlatform {
            os: os.map_or_else(|| raw_os.to_string(), |os| os.as_str().to_string()),
            arch: arch.map_or_else(|| raw_arch.to_string(), |arch| arch.as_str().to_string()),
        }),
    }
}

/// Detect current platform (cached after first call)
pub fn detect() -> Result<Platform> {
    PLATFORM_CACHE
        .get_or_try_init(|| resolve_platform(std::env::consts::OS, std::env::consts::ARCH))
        .copied()
}
