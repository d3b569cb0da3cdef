//! Observer trait for controller lifecycle events.
//!
//! Inject an [`Arc<dyn ConversionObserver>`] via
//! [`crate::controller::ConversionController::with_observer`] to be told when
//! a submission starts, finishes, fails, or when the visible error clears.
//! The CLI uses it to drive a spinner; a UI would re-render from
//! [`crate::controller::ConversionController::snapshot`].
//!
//! # Example
//!
//! ```rust
//! use fileconvert::ConversionObserver;
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Log(Mutex<Vec<String>>);
//!
//! impl ConversionObserver for Log {
//!     fn on_error(&self, message: &str) {
//!         self.0.lock().unwrap().push(message.to_string());
//!     }
//! }
//!
//! let log = Arc::new(Log::default());
//! log.on_error("Please choose a file to convert.");
//! assert_eq!(log.0.lock().unwrap().len(), 1);
//! ```

use crate::format::Format;
use std::path::Path;
use std::sync::Arc;

/// Called by the controller as an attempt moves through its states.
///
/// `on_error_cleared` fires from the auto-clear timer task, so
/// implementations must be `Send + Sync`. Every method defaults to a no-op.
pub trait ConversionObserver: Send + Sync {
    /// A validated request is about to be sent.
    fn on_submit(&self, from: Format, to: Format, file_name: &str) {
        let _ = (from, to, file_name);
    }

    /// The service returned a result URL.
    fn on_converted(&self, url: &str) {
        let _ = url;
    }

    /// A failure message became visible.
    fn on_error(&self, message: &str) {
        let _ = message;
    }

    /// The visible failure message went away (timeout or explicit clear).
    fn on_error_cleared(&self) {}

    /// The result was saved locally.
    fn on_download_complete(&self, path: &Path) {
        let _ = path;
    }
}

/// Default observer; ignores every event.
pub struct NoopObserver;

impl ConversionObserver for NoopObserver {}

/// Convenience alias for the shared observer handle.
pub type Observer = Arc<dyn ConversionObserver>;
