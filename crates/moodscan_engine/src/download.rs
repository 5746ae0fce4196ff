use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use moodscan_logging::moodscan_info;
use thiserror::Error;

use crate::{artifact_filename, replace_file, PersistError};

#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_bytes: 50 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid download link: {0}")]
    InvalidLink(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("artifact too large (max {max_bytes}, actual {actual})")]
    TooLarge { max_bytes: u64, actual: u64 },
    #[error("network error: {0}")]
    Network(String),
    #[error("could not save artifact: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone)]
pub struct ArtifactDownloader {
    settings: DownloadSettings,
    client: reqwest::Client,
}

impl ArtifactDownloader {
    pub fn new(settings: DownloadSettings) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| DownloadError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }

    /// Streams `link` into `dest_dir`, returning the written path.
    pub async fn download(
        &self,
        link: &str,
        suggested_filename: Option<&str>,
        dest_dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let parsed =
            url::Url::parse(link).map_err(|err| DownloadError::InvalidLink(err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DownloadError::InvalidLink(format!(
                "unsupported scheme {}",
                parsed.scheme()
            )));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|err| DownloadError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus(status.as_u16()));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(DownloadError::TooLarge {
                    max_bytes,
                    actual: content_len,
                });
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| DownloadError::Network(err.to_string()))?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(DownloadError::TooLarge {
                    max_bytes,
                    actual: next_len,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        let filename = artifact_filename(suggested_filename, link);
        let path = replace_file(dest_dir, &filename, &bytes)?;
        moodscan_info!("Saved artifact {} ({} bytes) to {:?}", link, bytes.len(), path);
        Ok(path)
    }
}
