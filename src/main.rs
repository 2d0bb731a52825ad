use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use log::debug;
use tokio_util::sync::CancellationToken;

use forgo_create::cli::Args;
use forgo_create::runners;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            std::process::exit(0);
        }
        Err(e) => {
            runners::print_failure(e.to_string().trim_end());
            std::process::exit(1);
        }
    };

    let default_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(real_main(args)) {
        debug!("{e:?}");
        runners::print_failure(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn real_main(args: Args) -> Result<()> {
    let cancel = CancellationToken::new();

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    runners::run_create(&args, cancel).await?;
    Ok(())
}
