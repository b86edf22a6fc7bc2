use std::path::Path;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::progress::ProgressSink;
use crate::api::ReleaseClient;
use crate::domain::{InstallError, ProgressRange};

/// Streams a single asset to disk with progress and cooperative cancellation.
#[derive(Clone)]
pub struct Fetcher {
    client: ReleaseClient,
}

impl Fetcher {
    pub fn new(client: ReleaseClient) -> Self {
        Self { client }
    }

    /// Download `url` into `destination`, reporting progress inside `range`.
    ///
    /// The token is checked before the request and before every chunk is
    /// written. On cancellation the partial file is left for the caller.
    /// Returns the number of bytes written.
    pub async fn fetch(
        &self,
        url: &str,
        destination: &Path,
        range: ProgressRange,
        cancel: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> Result<u64, InstallError> {
        if cancel.is_cancelled() {
            return Err(InstallError::Cancelled);
        }

        let (total, stream) = self
            .client
            .download_stream(url)
            .await
            .map_err(|e| InstallError::Download(e.to_string()))?;
        let mut stream = std::pin::pin!(stream);

        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(|e| InstallError::Download(format!("Failed to create file: {}", e)))?;

        info!(url, total = ?total, "downloading");
        sink.progress(range.start);

        let mut downloaded: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| InstallError::Download(e.to_string()))?;

            if cancel.is_cancelled() {
                if let Err(e) = file.flush().await {
                    warn!(error = %e, "failed to flush partial download");
                }
                debug!(downloaded, "download cancelled");
                return Err(InstallError::Cancelled);
            }

            file.write_all(&chunk)
                .await
                .map_err(|e| InstallError::Download(format!("Write error: {}", e)))?;
            downloaded += chunk.len() as u64;

            // Without a declared length we cannot tell how far along we are
            let fraction = match total {
                Some(t) if t > 0 => downloaded as f64 / t as f64,
                _ => 0.0,
            };
            sink.progress(range.at(fraction));
        }

        file.sync_all()
            .await
            .map_err(|e| InstallError::Download(format!("Failed to sync file: {}", e)))?;

        sink.progress(range.end);
        info!(url, downloaded, "download complete");
        Ok(downloaded)
    }
}
