//! Test doubles for the service and downloader seams.
//!
//! [`MockConversionService`] records every call and replies with a canned
//! [`MockResponse`]; [`RecordingDownloader`] records what would have been
//! downloaded without touching the network or disk.
//!
//! ```rust
//! use fileconvert::testing::{MockConversionService, RecordingDownloader};
//! use fileconvert::{ConversionController, ConverterConfig, Format, SelectedFile};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let service = Arc::new(MockConversionService::with_urls(["https://files.example/a.docx"]));
//! let controller = ConversionController::new(
//!     &ConverterConfig::default(),
//!     service.clone(),
//!     Arc::new(RecordingDownloader::default()),
//! );
//! controller.select_file(SelectedFile::new("a.pdf", b"%PDF".to_vec()));
//! controller.set_target_format(Some(Format::Docx));
//! let url = controller.submit_conversion().await.unwrap();
//! assert_eq!(url, "https://files.example/a.docx");
//! assert_eq!(service.call_count(), 1);
//! # }
//! ```

use crate::download::{output_file_name, ResultDownloader};
use crate::error::{FileConvertError, ServiceError};
use crate::format::Format;
use crate::params::ConversionParams;
use crate::service::{ConversionService, OutputFile};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A call received by [`MockConversionService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub from: Format,
    pub to: Format,
    pub file_name: String,
    pub file_len: usize,
    /// Extra parameters, in the order they were added.
    pub params: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// What the mock replies with.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Files(Vec<OutputFile>),
    Error(ServiceError),
}

/// Scriptable [`ConversionService`].
#[derive(Debug)]
pub struct MockConversionService {
    calls: Mutex<Vec<RecordedCall>>,
    response: Mutex<MockResponse>,
    gate: Option<Arc<Notify>>,
}

impl Default for MockConversionService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConversionService {
    /// Replies with a single file at `https://files.example/converted`.
    pub fn new() -> Self {
        Self::returning(MockResponse::Files(vec![OutputFile::from_url(
            "https://files.example/converted",
        )]))
    }

    pub fn returning(response: MockResponse) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            response: Mutex::new(response),
            gate: None,
        }
    }

    pub fn with_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::returning(MockResponse::Files(
            urls.into_iter().map(OutputFile::from_url).collect(),
        ))
    }

    /// Succeeds with no files.
    pub fn empty() -> Self {
        Self::returning(MockResponse::Files(Vec::new()))
    }

    pub fn failing(error: ServiceError) -> Self {
        Self::returning(MockResponse::Error(error))
    }

    /// Make every call wait for a permit on the returned [`Notify`] before
    /// replying.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn set_response(&self, response: MockResponse) {
        *lock(&self.response) = response;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl ConversionService for MockConversionService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(
        &self,
        from: Format,
        to: Format,
        params: ConversionParams,
    ) -> Result<Vec<OutputFile>, ServiceError> {
        lock(&self.calls).push(RecordedCall {
            from,
            to,
            file_name: params.file().name().to_string(),
            file_len: params.file().len(),
            params: params.extra().to_vec(),
        });

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match lock(&self.response).clone() {
            MockResponse::Files(files) => Ok(files),
            MockResponse::Error(e) => Err(e),
        }
    }
}

/// [`ResultDownloader`] that records requests and returns a bare file name.
#[derive(Debug, Default)]
pub struct RecordingDownloader {
    downloads: Mutex<Vec<OutputFile>>,
    fail: bool,
}

impl RecordingDownloader {
    /// Every download fails with [`FileConvertError::DownloadFailed`].
    pub fn failing() -> Self {
        Self {
            downloads: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn downloads(&self) -> Vec<OutputFile> {
        lock(&self.downloads).clone()
    }
}

#[async_trait]
impl ResultDownloader for RecordingDownloader {
    async fn download(&self, file: &OutputFile) -> Result<PathBuf, FileConvertError> {
        if self.fail {
            return Err(FileConvertError::DownloadFailed {
                url: file.url.clone(),
                reason: "simulated failure".into(),
            });
        }
        lock(&self.downloads).push(file.clone());
        Ok(PathBuf::from(output_file_name(file)))
    }
}
