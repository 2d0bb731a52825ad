use std::fs;
use std::path::Path;

use clap::Parser;
use forgo_create::install::download::{Arch, Os, Platform, resolve_platform};
use forgo_create::install::path::{normalize_dir, register_bin_dir};
use forgo_create::install::{HostEnv, InstallContext, PathUpdate, Provisioned, ensure_installed, install};
use forgo_create::{Args, CreateConfig, CreateError};
use tokio_util::sync::CancellationToken;

fn args(argv: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("forgo-create").chain(argv.iter().copied())).unwrap()
}

fn linux_context(root: &Path, base_url: &str) -> InstallContext {
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

#[test]
fn two_letter_name_is_an_input_error() {
    let err = args(&["ab", "--type", "jsr"]).to_options().unwrap_err();
    assert!(err.is_input_error());
    assert!(matches!(err, CreateError::InvalidName { .. }));
}

#[test]
fn unknown_type_names_the_only_tag() {
    let err = args(&["my-service", "--type", "bogus"]).to_options().unwrap_err();
    assert!(err.is_input_error());
    assert!(err.to_string().contains("jsr"), "{err}");
}

#[test]
fn arm32_linux_is_unsupported() {
    let err = resolve_platform("linux", "arm").unwrap_err();
    assert!(matches!(err, CreateError::UnsupportedPlatform { .. }));
    assert!(err.to_string().contains("linux/arm"));
}

#[tokio::test]
async fn http_404_names_url_and_installs_nothing() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/v0.5.12/boilerplate_linux_amd64")
        .with_status(404)
        .create_async()
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let ctx = linux_context(tmp.path(), &server.url());

    let err = install(&ctx, &HostEnv::default(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CreateError::HttpStatus { .. }));
    assert!(err.to_string().contains(&format!("{}/v0.5.12/boilerplate_linux_amd64", server.url())));
    assert!(!tmp.path().join("bin").join("boilerplate").exists());
}

#[tokio::test]
async fn first_run_installs_then_reuses() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v0.5.12/boilerplate_linux_amd64")
        .with_status(200)
        .with_body("not-really-a-binary")
        .expect(1)
        .create_async()
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let ctx = linux_context(tmp.path(), &server.url());
    let cancel = CancellationToken::new();

    let first = ensure_installed(&ctx, &HostEnv::default(), &cancel).await.unwrap();
    match &first {
        Provisioned::Installed(outcome) => {
            assert_eq!(outcome.bytes, 19);
            assert_eq!(outcome.path_update, PathUpdate::Skipped);
        }
        other => panic!("expected a fresh install, got {other:?}"),
    }

    // the stand-in binary cannot report a version, so it is trusted as current
    let second = ensure_installed(&ctx, &HostEnv::default(), &cancel).await.unwrap();
    assert!(matches!(second, Provisioned::AlreadyInstalled { .. }));
    assert_eq!(first.binary(), second.binary());

    mock.assert_async().await;
}

#[test]
fn zsh_profile_gets_one_entry() {
    let tmp = tempfile::tempdir().unwrap();
    let home = tmp.path();
    let bin = home.join(".boilerplate").join("bin");
    let env = HostEnv {
        home: Some(home.display().to_string()),
        shell: Some("/bin/zsh".to_string()),
        ..HostEnv::default()
    };

    register_bin_dir(Os::Darwin, &env, &bin);
    register_bin_dir(Os::Darwin, &env, &bin);

    let profile = fs::read_to_string(home.join(".zshrc")).unwrap();
    assert_eq!(profile.matches(&normalize_dir(&bin)).count(), 1);
}
