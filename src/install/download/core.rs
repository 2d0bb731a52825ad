//! Release asset download into the staging directory

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, warn};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::error::{CreateError, Result};

/// Timeouts applied to a single asset download
#[derive(Debug, Clone, Copy)]
pub struct DownloadLimits {
    /// Initial connection
    pub connect: Duration,
    /// Whole transfer, from request to last byte
    pub total: Duration,
}

impl Default for DownloadLimits {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            total: Duration::from_secs(300),
        }
    }
}

/// Build the HTTP client used for release downloads
pub fn build_client(limits: DownloadLimits) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(limits.connect)
        .user_agent(concat!("forgo-create/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Download `url` into `staged`, returning the number of bytes written.
///
/// The transfer races `cancel` and the total timeout. On any failure the
/// partial staging file is removed, so nothing half-written survives.
pub async fn download_to_staging(
    client: &reqwest::Client,
    url: &str,
    staged: &Path,
    limits: DownloadLimits,
    cancel: &CancellationToken,
) -> Result<u64> {
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CreateError::DownloadCancelled { url: url.to_string() }),
        outcome = tokio::time::timeout(limits.total, fetch(client, url, staged)) => match outcome {
            Ok(result) => result,
            Err(_) => Err(CreateError::DownloadTimeout {
                url: url.to_string(),
                seconds: limits.total.as_secs(),
            }),
        },
    };

    if result.is_err() {
        discard_partial(staged).await;
    }
    result
}

async fn fetch(client: &reqwest::Client, url: &str, staged: &Path) -> Result<u64> {
    let transport = |source: reqwest::Error| CreateError::Transport {
        url: url.to_string(),
        source,
    };

    debug!("GET {url}");
    let response = client.get(url).send().await.map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(CreateError::HttpStatus {
            url: url.to_string(),
            status,
        });
    }

    let progress = progress_bar(response.content_length());

    let mut file = tokio::fs::File::create(staged)
        .await
        .map_err(|e| CreateError::fs("create staging file", staged, e))?;

    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(transport)?;
        file.write_all(&chunk)
            .await
            .map_err(|e| CreateError::fs("write staging file", staged, e))?;
        downloaded += chunk.len() as u64;
        progress.set_position(downloaded);
    }

    file.flush()
        .await
        .map_err(|e| CreateError::fs("flush staging file", staged, e))?;
    file.sync_all()
        .await
        .map_err(|e| CreateError::fs("sync staging file", staged, e))?;

    progress.finish_and_clear();
    debug!("Downloaded {downloaded} bytes to {}", staged.display());
    Ok(downloaded)
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    match total {
        Some(len) => {
            let bar = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr());
            if let Ok(style) = ProgressStyle::default_bar()
                .template("   [{bar:40.green/blue}] {bytes}/{total_bytes}  {msg}")
            {
                bar.set_style(style.progress_chars("█▓░"));
            }
            bar
        }
        None => ProgressBar::new_spinner(),
    }
}

async fn discard_partial(staged: &Path) {
    match tokio::fs::remove_file(staged).await {
        Ok(()) => debug!("Removed partial download {}", staged.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial download {}: {e}", staged.display()),
    }
}
