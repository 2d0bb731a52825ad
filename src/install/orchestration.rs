//! Installation orchestration: directories, download, staging, PATH
//!
//! Each step is its own failure domain. Steps 1-4 are fatal and leave at most
//! a file in `download/`; step 5 only ever downgrades to a warning.

use std::path::PathBuf;

use log::info;
use tokio_util::sync::CancellationToken;

use crate::error::{CreateError, Result};

use super::binary_staging::{make_executable, promote};
use super::context::InstallContext;
use super::detection::{InstallState, check_installation_state};
use super::download::{build_client, download_to_staging};
use super::environment::HostEnv;
use super::path::{PathPlan, PathUpdate, plan_path_update, register_bin_dir};

/// Results from an actual installation
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub installed_binary: PathBuf,
    pub bytes: u64,
    pub path_update: PathUpdate,
}

/// How the binary came to be available
#[derive(Debug, Clone)]
pub enum Provisioned {
    AlreadyInstalled { binary: PathBuf },
    Installed(InstallOutcome),
}

impl Provisioned {
    pub fn binary(&self) -> &PathBuf {
        match self {
            Provisioned::AlreadyInstalled { binary } => binary,
            Provisioned::Installed(outcome) => &outcome.installed_binary,
        }
    }
}

/// Download and install the boilerplate binary described by `ctx`
pub async fn install(
    ctx: &InstallContext,
    env: &HostEnv,
    cancel: &CancellationToken,
) -> Result<InstallOutcome> {
    // 1. layout
    ctx.ensure_dirs()?;

    // 2. fetch into staging
    info!("Downloading {}", ctx.url);
    let client = build_client(ctx.limits).map_err(|source| CreateError::Transport {
        url: ctx.url.clone(),
        source,
    })?;
    let bytes =
        download_to_staging(&client, &ctx.url, &ctx.staged_binary, ctx.limits, cancel).await?;

    // 3. + 4. executable, then rename into bin/
    make_executable(&ctx.staged_binary)?;
    promote(&ctx.staged_binary, &ctx.installed_binary)?;
    info!(
        "{} installed successfully to {}",
        ctx.installed_binary
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        ctx.installed_binary.display()
    );

    // 5. best effort
    let path_update = if ctx.update_path {
        register_bin_dir(ctx.platform.os, env, &ctx.bin_dir)
    } else {
        PathUpdate::Skipped
    };

    Ok(InstallOutcome {
        installed_binary: ctx.installed_binary.clone(),
        bytes,
        path_update,
    })
}

/// Install only when the binary is missing or reports another release
pub async fn ensure_installed(
    ctx: &InstallContext,
    env: &HostEnv,
    cancel: &CancellationToken,
) -> Result<Provisioned> {
    match check_installation_state(&ctx.installed_binary, &ctx.version).await {
        InstallState::Current => {
            info!("Installation verified: {}", ctx.installed_binary.display());
            Ok(Provisioned::AlreadyInstalled {
                binary: ctx.installed_binary.clone(),
            })
        }
        InstallState::Missing => {
            info!("boilerplate not installed, installing {}", ctx.version);
            install(ctx, env, cancel).await.map(Provisioned::Installed)
        }
        InstallState::Outdated { found } => {
            info!("boilerplate {found} installed, replacing with {}", ctx.version);
            install(ctx, env, cancel).await.map(Provisioned::Installed)
        }
    }
}

/// Human-readable list of what [`ensure_installed`] would do, without doing it
pub async fn planned_actions(ctx: &InstallContext, env: &HostEnv) -> Vec<String> {
    let state = check_installation_state(&ctx.installed_binary, &ctx.version).await;
    if !state.needs_install() {
        return vec![format!(
            "use installed {} ({})",
            ctx.installed_binary.display(),
            ctx.version
        )];
    }

    let mut actions = vec![
        format!("create directory {}", ctx.bin_dir.display()),
        format!("create directory {}", ctx.download_dir.display()),
        format!("download {} -> {}", ctx.url, ctx.staged_binary.display()),
    ];
    if cfg!(unix) {
        actions.push(format!("chmod 755 {}", ctx.staged_binary.display()));
    }
    actions.push(format!(
        "move {} -> {}",
        ctx.staged_binary.display(),
        ctx.installed_binary.display()
    ));

    if ctx.update_path {
        actions.push(describe_path_plan(&plan_path_update(
            ctx.platform.os,
            env,
            &ctx.bin_dir,
        )));
    }
    actions
}

fn describe_path_plan(plan: &PathPlan) -> String {
    match plan {
        PathPlan::SetWindowsPath { .. } => "add bin directory to the user PATH (setx)".to_string(),
        PathPlan::AppendProfile { profile, line } => {
            format!("append '{line}' to {}", profile.display())
        }
        PathPlan::AlreadyPresent { target } => format!("PATH already set via {target}"),
        PathPlan::Manual { dir, reason } => {
            format!("leave PATH unchanged ({reason}); add {} manually", dir.display())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;
    use crate::config::CreateConfig;
    use crate::install::download::{Arch, Os, Platform};

    fn context(root: &std::path::Path, base_url: &str) -> InstallContext {
        let config = CreateConfig {
            install_root: Some(root.to_path_buf()),
            release_base_url: base_url.to_string(),
            update_path: false,
            ..CreateConfig::default()
        };
        InstallContext::new(
            &config,
            &HostEnv::default(),
            Platform::new(Os::Linux, Arch::Amd64),
            &config.catalog(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn installs_into_bin() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/v0.5.12/boilerplate_linux_amd64")
            .with_status(200)
            .with_body("#!/bin/sh\necho boilerplate version v0.5.12\n")
            .create_async()
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path(), &server.url());

        let outcome = install(&ctx, &HostEnv::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.installed_binary, tmp.path().join("bin/boilerplate"));
        assert!(crate::install::binary_staging::is_executable(&outcome.installed_binary));
        assert!(!ctx.staged_binary.exists());
        assert_eq!(outcome.path_update, PathUpdate::Skipped);
    }

    #[tokio::test]
    async fn not_found_leaves_nothing_installed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/v0.5.12/boilerplate_linux_amd64")
            .with_status(404)
            .create_async()
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path(), &server.url());

        let err = install(&ctx, &HostEnv::default(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(err.is_network_error());
        assert!(err.to_string().contains(&ctx.url));
        assert!(!ctx.installed_binary.exists());
        assert!(!ctx.staged_binary.exists());
    }

    #[tokio::test]
    async fn stalled_download_installs_nothing() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/v0.5.12/boilerplate_linux_amd64")
            .with_status(200)
            .with_chunked_body(|w| {
                w.write_all(b"#!/bin/sh\n")?;
                w.flush()?;
                std::thread::sleep(std::time::Duration::from_secs(3));
                w.write_all(b"echo late\n")
            })
            .create_async()
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let mut ctx = context(tmp.path(), &server.url());
        ctx.limits.total = std::time::Duration::from_millis(300);

        let err = install(&ctx, &HostEnv::default(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, CreateError::DownloadTimeout { .. }), "{err:?}");
        assert!(!ctx.staged_binary.exists());
        assert_eq!(std::fs::read_dir(&ctx.bin_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn dry_run_lists_every_step() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path(), "https://example.com/releases");

        let actions = planned_actions(&ctx, &HostEnv::default()).await;
        assert!(actions.iter().any(|a| a.starts_with("download https://example.com/releases/v0.5.12/")));
        assert!(actions.iter().any(|a| a.starts_with("move ")));
        assert!(!tmp.path().join("bin").exists(), "dry run must not touch disk");
    }
}
