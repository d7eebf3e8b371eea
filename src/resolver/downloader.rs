use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches one archive to a local file.
pub trait ArchiveFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// `timeout` bounds the whole request, body included.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl ArchiveFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        log::info!("Downloading from {} to {:?}", url, dest);

        let mut response = self.client.get(url).send().await.map_err(|e| {
            log::error!("Failed to send GET request to {}: {:?}", url, e);
            anyhow::anyhow!("Failed to send GET request to {}: {}", url, e)
        })?;

        if !response.status().is_success() {
            let status = response.status();
            log::error!("Download failed for {}: HTTP status {}", url, status);
            return Err(anyhow::anyhow!("Download failed for {}: HTTP status {}", url, status));
        }

        let mut file = fs::File::create(dest).await.map_err(|e| {
            log::error!("Failed to create file {:?}: {:?}", dest, e);
            anyhow::anyhow!("Failed to create file {:?}: {}", dest, e)
        })?;

        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            log::error!("Failed to read chunk from response for {}: {:?}", url, e);
            anyhow::anyhow!("Failed to read chunk from response for {}: {}", url, e)
        })? {
            file.write_all(&chunk).await.map_err(|e| {
                log::error!("Failed to write chunk to file {:?}: {:?}", dest, e);
                anyhow::anyhow!("Failed to write chunk to file {:?}: {}", dest, e)
            })?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        let megabytes = written as f64 / 1_048_576.0;
        log::info!("Download completed: {:.1} MB written to {:?}", megabytes, dest);
        Ok(())
    }
}
