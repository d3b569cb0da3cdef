//! The conversion request controller.
//!
//! ## Lifecycle
//!
//! ```text
//! select_file ─▶ Idle ──submit──▶ validate ─┬─▶ rejected ─▶ Idle + notice
//!                 ▲                         └─▶ Submitting ─┬─▶ Succeeded(url)
//!                 │                                         └─▶ Idle + notice
//!                 └──────────── download_result ◀────────────────┘
//! ```
//!
//! The controller owns the whole interaction state: selected file, format
//! pair, in-flight flag, result and visible error. It never holds its lock
//! across an `.await`, so it can be shared behind an `Arc` and driven from
//! several tasks.

use crate::config::ConverterConfig;
use crate::download::ResultDownloader;
use crate::error::{FileConvertError, SubmitError};
use crate::file::SelectedFile;
use crate::format::{CompatibilityTable, Format};
use crate::notice::NoticeBoard;
use crate::params::ConversionParams;
use crate::progress::{NoopObserver, Observer};
use crate::service::{ConversionService, OutputFile};
use crate::validate::{validate_submission, FormatSelection};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{error, info, warn};

/// Where the current attempt stands.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Idle,
    Submitting,
    Succeeded(OutputFile),
}

struct ControllerState {
    file: Option<SelectedFile>,
    selection: FormatSelection,
    phase: Phase,
    /// Bumped on every file selection and download so a late response can
    /// tell it no longer belongs to the current attempt.
    attempt: u64,
}

/// Read-only view of the controller for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    pub file_name: Option<String>,
    pub source: Option<Format>,
    pub target: Option<Format>,
    pub loading: bool,
    pub result_url: Option<String>,
    pub error_message: Option<String>,
}

/// Mediates between user input and the conversion service.
pub struct ConversionController {
    service: Arc<dyn ConversionService>,
    downloader: Arc<dyn ResultDownloader>,
    observer: Observer,
    table: &'static CompatibilityTable,
    defaults: FormatSelection,
    state: Mutex<ControllerState>,
    notices: NoticeBoard,
}

impl ConversionController {
    pub fn new(
        config: &ConverterConfig,
        service: Arc<dyn ConversionService>,
        downloader: Arc<dyn ResultDownloader>,
    ) -> Self {
        let observer: Observer = Arc::new(NoopObserver);
        let defaults = config.default_selection();
        Self {
            service,
            downloader,
            notices: NoticeBoard::new(config.error_display(), Arc::clone(&observer)),
            observer,
            table: CompatibilityTable::standard(),
            defaults,
            state: Mutex::new(ControllerState {
                file: None,
                selection: defaults,
                phase: Phase::Idle,
                attempt: 0,
            }),
        }
    }

    /// Attach an observer. Replaces the default no-op one.
    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.notices = NoticeBoard::new(self.notices.display_for(), Arc::clone(&observer));
        self.observer = observer;
        self
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `file` as the current selection and start a fresh attempt.
    ///
    /// Clears any previous result and any visible error. The file is not
    /// checked here; that happens on submit.
    pub fn select_file(&self, file: SelectedFile) {
        {
            let mut state = self.lock();
            state.file = Some(file);
            state.attempt += 1;
            if matches!(state.phase, Phase::Succeeded(_)) {
                state.phase = Phase::Idle;
            }
        }
        self.notices.clear();
    }

    pub fn set_source_format(&self, format: Option<Format>) {
        self.lock().selection.source = format;
    }

    pub fn set_target_format(&self, format: Option<Format>) {
        self.lock().selection.target = format;
    }

    pub fn is_loading(&self) -> bool {
        self.lock().phase == Phase::Submitting
    }

    /// URL of the current result, if the last attempt succeeded.
    pub fn result_url(&self) -> Option<String> {
        match &self.lock().phase {
            Phase::Succeeded(file) => Some(file.url.clone()),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.notices.current()
    }

    pub fn error_display(&self) -> Duration {
        self.notices.display_for()
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let state = self.lock();
        ControllerSnapshot {
            file_name: state.file.as_ref().map(|f| f.name().to_string()),
            source: state.selection.source,
            target: state.selection.target,
            loading: state.phase == Phase::Submitting,
            result_url: match &state.phase {
                Phase::Succeeded(file) => Some(file.url.clone()),
                _ => None,
            },
            error_message: self.notices.current(),
        }
    }

    /// Validate the current selection and, if it passes, convert it.
    ///
    /// Returns the result URL. Every failure except [`SubmitError::Busy`] and
    /// [`SubmitError::Superseded`] is also posted as the visible error message.
    ///
    /// Selecting a new file while the request is in flight starts a new
    /// attempt; this call then returns [`SubmitError::Superseded`] and leaves
    /// the result and notice untouched.
    pub async fn submit_conversion(&self) -> Result<String, SubmitError> {
        // ── Validate and enter loading ───────────────────────────────────
        let (request, attempt) = {
            let mut state = self.lock();
            if state.phase == Phase::Submitting {
                return Err(SubmitError::Busy);
            }
            match validate_submission(state.file.as_ref(), state.selection, self.table) {
                Ok(request) => {
                    state.phase = Phase::Submitting;
                    (request, state.attempt)
                }
                Err(e) => {
                    drop(state);
                    warn!("Conversion rejected: {}", e);
                    return Err(self.fail(e));
                }
            }
        };
        self.notices.clear();

        let (from, to) = (request.from, request.to);
        let file_name = request.file.name().to_string();
        info!(
            "Submitting {} ({} bytes): {} → {} via {}",
            file_name,
            request.file.len(),
            from,
            to,
            self.service.name()
        );
        self.observer.on_submit(from, to, &file_name);

        // ── Dispatch ─────────────────────────────────────────────────────
        let params = ConversionParams::for_pair(request.file, from, to);
        let outcome = self.service.convert(from, to, params).await;

        // ── Settle ───────────────────────────────────────────────────────
        let mut state = self.lock();
        state.phase = Phase::Idle;

        if state.attempt != attempt {
            drop(state);
            match &outcome {
                Ok(files) => info!(
                    "Discarding {} file(s) for {}: a newer file was selected",
                    files.len(),
                    file_name
                ),
                Err(e) => info!("Discarding failure for {}: {}", file_name, e),
            }
            return Err(SubmitError::Superseded);
        }

        match outcome {
            Ok(files) => match files.into_iter().next() {
                Some(first) => {
                    let url = first.url.clone();
                    state.phase = Phase::Succeeded(first);
                    drop(state);
                    info!("Conversion complete: {}", url);
                    self.observer.on_converted(&url);
                    Ok(url)
                }
                None => {
                    drop(state);
                    warn!("Service returned no files for {} → {}", from, to);
                    Err(self.fail(SubmitError::EmptyResult))
                }
            },
            Err(source) => {
                drop(state);
                error!("Conversion error: {}", source);
                Err(self.fail(SubmitError::ConversionServiceError { source }))
            }
        }
    }

    /// Save the current result locally and reset to a fresh session.
    ///
    /// Returns `Ok(None)` without doing anything when there is no result.
    /// On failure the result is kept so the download can be retried.
    pub async fn download_result(&self) -> Result<Option<PathBuf>, FileConvertError> {
        let file = match &self.lock().phase {
            Phase::Succeeded(file) => file.clone(),
            _ => return Ok(None),
        };

        let path = self.downloader.download(&file).await?;

        {
            let mut state = self.lock();
            // Only reset if nothing replaced the result while downloading.
            if state.phase == Phase::Succeeded(file) {
                state.file = None;
                state.phase = Phase::Idle;
                state.selection = self.defaults;
                state.attempt += 1;
            }
        }
        self.observer.on_download_complete(&path);
        Ok(Some(path))
    }

    /// Post `err` as the visible message and clear any result.
    fn fail(&self, err: SubmitError) -> SubmitError {
        {
            let mut state = self.lock();
            if matches!(state.phase, Phase::Succeeded(_)) {
                state.phase = Phase::Idle;
            }
        }
        self.notices.post(err.to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockConversionService, RecordingDownloader};

    fn controller(service: Arc<MockConversionService>) -> ConversionController {
        ConversionController::new(
            &ConverterConfig::default(),
            service,
            Arc::new(RecordingDownloader::default()),
        )
    }

    #[tokio::test]
    async fn starts_with_configured_defaults() {
        let c = controller(Arc::new(MockConversionService::new()));
        let snap = c.snapshot();
        assert_eq!(snap.source, Some(Format::Pdf));
        assert_eq!(snap.target, None);
        assert!(!snap.loading);
        assert!(snap.result_url.is_none() && snap.error_message.is_none());
    }

    #[tokio::test]
    async fn rejection_posts_message_without_calling_service() {
        let service = Arc::new(MockConversionService::new());
        let c = controller(service.clone());

        let err = c.submit_conversion().await.unwrap_err();
        assert!(matches!(err, SubmitError::MissingFile));
        assert_eq!(
            c.error_message().as_deref(),
            Some("Please choose a file to convert.")
        );
        assert_eq!(service.call_count(), 0);
        assert!(!c.is_loading());
    }

    #[tokio::test]
    async fn selecting_a_file_clears_error() {
        let c = controller(Arc::new(MockConversionService::new()));
        let _ = c.submit_conversion().await;
        assert!(c.error_message().is_some());

        c.select_file(SelectedFile::new("a.pdf", b"%PDF".to_vec()));
        assert!(c.error_message().is_none());
    }

    #[tokio::test]
    async fn success_stores_first_url() {
        let service = Arc::new(MockConversionService::with_urls([
            "https://files.example/one.docx",
            "https://files.example/two.docx",
        ]));
        let c = controller(service.clone());
        c.select_file(SelectedFile::new("a.pdf", b"%PDF".to_vec()));
        c.set_target_format(Some(Format::Docx));

        let url = c.submit_conversion().await.unwrap();
        assert_eq!(url, "https://files.example/one.docx");
        assert_eq!(c.result_url().as_deref(), Some("https://files.example/one.docx"));
        assert!(!c.is_loading());

        let calls = service.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!((calls[0].from, calls[0].to), (Format::Pdf, Format::Docx));
        assert_eq!(calls[0].file_name, "a.pdf");
    }

    #[tokio::test]
    async fn failure_after_success_clears_result() {
        let service = Arc::new(MockConversionService::with_urls(["https://f/x.txt"]));
        let c = controller(service);
        c.select_file(SelectedFile::new("a.pdf", b"%PDF".to_vec()));
        c.set_target_format(Some(Format::Txt));
        c.submit_conversion().await.unwrap();

        c.set_target_format(Some(Format::Png));
        let err = c.submit_conversion().await.unwrap_err();
        assert!(matches!(err, SubmitError::UnsupportedConversion { .. }));
        assert!(c.result_url().is_none());
        assert!(c.error_message().is_some());
    }

    #[tokio::test]
    async fn stale_failure_is_superseded_without_notice() {
        let (service, gate) = MockConversionService::failing(crate::ServiceError::Network {
            reason: "reset".into(),
        })
        .gated();
        let c = Arc::new(controller(Arc::new(service)));
        c.select_file(SelectedFile::new("old.pdf", b"%PDF".to_vec()));
        c.set_target_format(Some(Format::Txt));

        let task = tokio::spawn({
            let c = Arc::clone(&c);
            async move { c.submit_conversion().await }
        });
        while !c.is_loading() {
            tokio::task::yield_now().await;
        }

        c.select_file(SelectedFile::new("new.pdf", b"%PDF".to_vec()));
        gate.notify_one();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, SubmitError::Superseded));
        assert!(!c.is_loading());
        assert!(c.error_message().is_none());
        assert!(c.result_url().is_none());
    }
}
