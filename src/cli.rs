use std::fmt;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use crate::error::{CreateError, Result};
use crate::validation::{validate_name, validate_type};

/// The type of boilerplate to create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateType {
    /// Public JSR package to publish to jsr.io
    Jsr,
}

impl CreateType {
    pub const ALL: [CreateType; 1] = [CreateType::Jsr];

    pub fn as_str(&self) -> &'static str {
        match self {
            CreateType::Jsr => "jsr",
        }
    }

    pub fn tags() -> Vec<&'static str> {
        Self::ALL.iter().map(CreateType::as_str).collect()
    }

    /// Human readable list of tags (`jsr | ...`)
    pub fn options() -> String {
        Self::tags().join(" | ")
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for CreateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated request for one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOptions {
    pub name: String,
    pub kind: CreateType,
}

/// Command-line arguments for forgo-create
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "forgo-create")]
#[command(version, about = "Create a new project from boilerplate")]
#[command(override_usage = "forgo-create [flags] <name>")]
pub struct Args {
    /// Artifact name (lower-kebab-case, starts with a letter, >= 3 characters)
    pub name: Option<String>,

    /// Type of boilerplate to create [required] [possible values: jsr]
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub kind: Option<String>,

    /// Show what would be output to disk
    #[arg(short, long)]
    pub dry: bool,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Leave PATH and shell profiles untouched
    #[arg(long)]
    pub no_path_update: bool,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Validate name then type, in that order
    pub fn to_options(&self) -> Result<CreateOptions> {
        let name = self.name.clone().ok_or(CreateError::MissingName)?;

        let check = validate_name(&name);
        if !check.valid {
            return Err(CreateError::InvalidName {
                name,
                suggestion: check.suggestion.to_string(),
            });
        }

        let Some(tag) = self.kind.as_deref() else {
            return Err(CreateError::MissingType {
                valid: CreateType::options(),
            });
        };
        if !validate_type(tag, &CreateType::tags()) {
            return Err(CreateError::UnknownType {
                given: tag.to_string(),
                valid: CreateType::options(),
            });
        }

        let kind = CreateType::from_tag(tag).ok_or_else(|| CreateError::UnknownType {
            given: tag.to_string(),
            valid: CreateType::options(),
        })?;

        Ok(CreateOptions { name, kind })
    }
}

/// Rendered help text
pub fn help_text() -> String {
    Args::command().render_help().to_string()
}
