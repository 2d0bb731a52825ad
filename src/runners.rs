//! Top-level create flow with terminal reporting
//!
//! parse → validate → resolve platform → (first run) install → generate

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tokio_util::sync::CancellationToken;

use crate::cli::{Args, CreateOptions};
use crate::config::CreateConfig;
use crate::error::{CreateError, Result};
use crate::generate::{GenerationPlan, run_generation};
use crate::install::download;
use crate::install::{
    HostEnv, InstallContext, InstallOutcome, PathUpdate, Provisioned, ensure_installed,
    planned_actions,
};

/// Run one create invocation
pub async fn run_create(args: &Args, cancel: CancellationToken) -> Result<()> {
    let options = args.to_options()?;

    let mut config = CreateConfig::load(args.config.as_deref())?;
    if args.no_path_update {
        config.update_path = false;
    }
    let env = HostEnv::from_process();

    print_running(&options);

    let platform = download::detect()?;
    let catalog = config.catalog();
    let ctx = InstallContext::new(&config, &env, platform, &catalog)?;

    let output_root = std::env::current_dir()
        .map_err(|e| CreateError::fs("read current directory", ".", e))?;
    let template = config.template_for(options.kind.as_str(), &ctx.root);
    let plan = GenerationPlan::new(&ctx.installed_binary, &options, template, &output_root);

    if args.dry {
        print_dry_run(&ctx, &env, &plan).await;
        return Ok(());
    }

    let provisioned = ensure_installed(&ctx, &env, &cancel).await?;
    if let Provisioned::Installed(outcome) = &provisioned {
        print_installed(outcome);
    }

    run_generation(&plan, &options).await?;

    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(stdout, "\n✅ Created {} at {}", options.name, plan.output.display());
    let _ = stdout.reset();
    Ok(())
}

/// Print the error, then help, to stderr
pub fn print_failure(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = writeln!(stderr);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = writeln!(stderr, "{message}");
    let _ = stderr.reset();
    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "{}", crate::cli::help_text());
}

fn print_running(options: &CreateOptions) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = writeln!(stdout);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true));
    let _ = writeln!(stdout, "Running forgo-create");
    let _ = stdout.reset();
    let _ = write!(stdout, "  name=");
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
    let _ = writeln!(stdout, "\"{}\"", options.name);
    let _ = stdout.reset();
    let _ = write!(stdout, "  type=");
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
    let _ = writeln!(stdout, "\"{}\"", options.kind);
    let _ = stdout.reset();
    let _ = writeln!(stdout);
}

async fn print_dry_run(ctx: &InstallContext, env: &HostEnv, plan: &GenerationPlan) {
    let actions = planned_actions(ctx, env).await;

    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "Dry run for {} (boilerplate {})", ctx.platform, ctx.version);
    let _ = stdout.reset();

    for action in actions {
        let _ = writeln!(stdout, "  • {action}");
    }
    let _ = writeln!(stdout, "  • run {}", plan.command_line());
}

fn print_installed(outcome: &InstallOutcome) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
    let _ = writeln!(
        stdout,
        "✓ boilerplate installed to {} ({} bytes)",
        outcome.installed_binary.display(),
        outcome.bytes
    );
    let _ = stdout.reset();

    match &outcome.path_update {
        PathUpdate::Updated { target } => {
            let _ = writeln!(stdout, "  Added to PATH in {target}; restart your shell to use it");
        }
        PathUpdate::AlreadyPresent { target } => {
            let _ = writeln!(stdout, "  PATH already configured in {target}");
        }
        PathUpdate::Skipped => {}
        PathUpdate::Manual { dir, reason } => {
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
            let _ = writeln!(stdout, "  ⚠ PATH not updated: {reason}");
            let _ = stdout.reset();
            let _ = writeln!(
                stdout,
                "  Please add the following directory to your PATH: {}",
                dir.display()
            );
        }
    }
}
