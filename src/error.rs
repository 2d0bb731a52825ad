//! Error taxonomy for the create front end and the boilerplate installer.
//!
//! Every fatal failure surfaces as a [`CreateError`]. Refusing or failing to
//! edit PATH is deliberately absent here: it is reported through
//! [`crate::install::PathUpdate::Manual`] and never aborts an install.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T, E = CreateError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CreateError {
    #[error("Name required")]
    MissingName,

    #[error("Invalid name '{name}': {suggestion}")]
    InvalidName { name: String, suggestion: String },

    #[error("Type required: {valid}")]
    MissingType { valid: String },

    #[error("Unknown type '{given}': expected {valid}")]
    UnknownType { given: String, valid: String },

    #[error("Unsupported platform: no boilerplate release for {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Failed to download {url}: HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to download {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download timeout after {seconds} seconds: {url}")]
    DownloadTimeout { url: String, seconds: u64 },

    #[error("Download cancelled: {url}")]
    DownloadCancelled { url: String },

    #[error("Failed to {action} {}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not determine home directory (HOME and USERPROFILE are unset)")]
    NoHomeDirectory,

    #[error("Invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("Template for type '{kind}' not found: {template}")]
    TemplateNotFound { kind: String, template: String },

    #[error("Failed to run {}", .binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("boilerplate exited with {status} while generating '{name}'")]
    GenerationFailed { name: String, status: ExitStatus },
}

impl CreateError {
    /// Filesystem failure carrying the path that was being touched.
    pub fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// True for user input problems (name/type), which are never retried.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingName
                | Self::InvalidName { .. }
                | Self::MissingType { .. }
                | Self::UnknownType { .. }
        )
    }

    /// True for failures talking to the release server.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            Self::HttpStatus { .. }
                | Self::Transport { .. }
                | Self::DownloadTimeout { .. }
                | Self::DownloadCancelled { .. }
        )
    }
}
