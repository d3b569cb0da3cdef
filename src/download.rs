//! Saving a converted result to local disk.
//!
//! The service hands back a URL; [`HttpDownloader`] fetches it and writes the
//! bytes under the configured directory. Writes go to a
//! `.part` file first and are renamed into place, so an interrupted download
//! never leaves a truncated file under the final name.

use crate::config::ConverterConfig;
use crate::error::FileConvertError;
use crate::service::OutputFile;
use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::info;

/// Name used when neither the service nor the URL suggests one.
pub const FALLBACK_FILE_NAME: &str = "converted";

/// Capability to materialise a conversion result locally.
#[async_trait]
pub trait ResultDownloader: Send + Sync {
    /// Fetch `file` and return where it was written.
    async fn download(&self, file: &OutputFile) -> Result<PathBuf, FileConvertError>;
}

/// Downloads results over HTTP into a directory.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
    dir: PathBuf,
}

impl HttpDownloader {
    pub fn new(config: &ConverterConfig) -> Result<Self, FileConvertError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FileConvertError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            dir: config.download_dir.clone(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ResultDownloader for HttpDownloader {
    async fn download(&self, file: &OutputFile) -> Result<PathBuf, FileConvertError> {
        let url = file.url.as_str();
        info!("Downloading result from: {}", url);

        let failed = |reason: String| FileConvertError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

        let path = self.dir.join(output_file_name(file));
        write_atomic(&path, &bytes).await?;
        info!("Saved {} bytes to: {}", bytes.len(), path.display());
        Ok(path)
    }
}

/// Pick a local file name for `file`.
///
/// Prefers the service-supplied name, then the last URL path segment that
/// looks like a file name, then [`FALLBACK_FILE_NAME`]. Path separators are
/// never allowed through.
pub fn output_file_name(file: &OutputFile) -> String {
    if let Some(name) = file.file_name.as_deref().and_then(sanitize) {
        return name;
    }

    if let Ok(parsed) = reqwest::Url::parse(&file.url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if last.contains('.') {
                    if let Some(name) = sanitize(last) {
                        return name;
                    }
                }
            }
        }
    }

    FALLBACK_FILE_NAME.to_string()
}

fn sanitize(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}

/// Write `bytes` to `path` via a sibling `.part` file and a rename.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), FileConvertError> {
    let write_failed = |source: std::io::Error| FileConvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".part");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_failed)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_failed(e));
    }
    Ok(())
}
