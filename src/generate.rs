//! Project generation through the installed boilerplate binary

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::cli::CreateOptions;
use crate::error::{CreateError, Result};

/// One `boilerplate` invocation, fully resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    pub program: PathBuf,
    pub template: String,
    pub output: PathBuf,
    pub args: Vec<String>,
}

impl GenerationPlan {
    pub fn new(binary: &Path, options: &CreateOptions, template: String, output_root: &Path) -> Self {
        let output = output_root.join(&options.name);
        let args = vec![
            "--template-url".to_string(),
            template.clone(),
            "--output-folder".to_string(),
            output.display().to_string(),
            "--non-interactive".to_string(),
            "--var".to_string(),
            format!("name={}", options.name),
            "--var".to_string(),
            format!("type={}", options.kind),
        ];

        Self {
            program: binary.to_path_buf(),
            template,
            output,
            args,
        }
    }

    /// Shell-style rendering for dry runs and logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Remote templates are handed to boilerplate untouched
    pub fn template_is_remote(&self) -> bool {
        self.template.contains("://") || self.template.starts_with("git@")
    }
}

/// Run boilerplate for `options`, failing on spawn errors or non-zero exit
pub async fn run_generation(plan: &GenerationPlan, options: &CreateOptions) -> Result<()> {
    if !plan.template_is_remote() && !Path::new(&plan.template).is_dir() {
        return Err(CreateError::TemplateNotFound {
            kind: options.kind.to_string(),
            template: plan.template.clone(),
        });
    }

    info!("Generating boilerplate files into {}", plan.output.display());
    debug!("Running {}", plan.command_line());

    let status = tokio::process::Command::new(&plan.program)
        .args(&plan.args)
        .status()
        .await
        .map_err(|source| CreateError::Spawn {
            binary: plan.program.clone(),
            source,
        })?;

    if !status.success() {
        return Err(CreateError::GenerationFailed {
            name: options.name.clone(),
            status,
        });
    }
    Ok(())
}
