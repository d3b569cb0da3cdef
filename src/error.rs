//! Error types for the fileconvert library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`SubmitError`]: **user-visible, non-fatal**. A conversion attempt was
//!   rejected locally or failed remotely. Its `Display` text is the exact
//!   message shown to the user, and the controller posts it to the
//!   [`crate::notice::NoticeBoard`] where it clears itself after a few seconds.
//!
//! * [`ServiceError`]: what the external conversion service reported (network,
//!   auth, remote). It travels as the `source` of
//!   [`SubmitError::ConversionServiceError`] so the detail is available to
//!   logs without leaking into the user-facing message.
//!
//! * [`FileConvertError`]: **fatal** for the operation that returned it
//!   (input file unreadable, no API secret, result could not be saved).

use crate::format::Format;
use std::path::PathBuf;
use thiserror::Error;

/// Why a conversion attempt did not produce a result.
///
/// Validation variants are checked in declaration order (`MissingFile` first,
/// `UnsupportedConversion` last); see [`crate::validate::validate_submission`].
#[derive(Debug, Error)]
pub enum SubmitError {
    // ── Local validation ──────────────────────────────────────────────────
    /// No file has been selected.
    #[error("Please choose a file to convert.")]
    MissingFile,

    /// The file's extension does not match the chosen source format.
    #[error(
        "Selected file type ({actual_extension}) does not match the \"Convert From\" format ({expected_format})."
    )]
    FormatMismatch {
        actual_extension: String,
        expected_format: String,
    },

    /// Source or target format is unset.
    #[error("Please select both formats.")]
    MissingFormatSelection,

    /// The pair is not in the compatibility table.
    #[error("Conversion from {from} to {to} is not supported.")]
    UnsupportedConversion { from: Format, to: Format },

    // ── Remote outcome ────────────────────────────────────────────────────
    /// The service accepted the request but returned no files.
    #[error("Conversion failed. No file returned.")]
    EmptyResult,

    /// The service call itself failed.
    #[error("Conversion failed. Please check the file format or try again.")]
    ConversionServiceError {
        #[source]
        source: ServiceError,
    },

    // ── Lifecycle ─────────────────────────────────────────────────────────
    /// A request is already in flight for this controller.
    ///
    /// Not posted as a notice; the in-flight attempt owns the visible state.
    #[error("A conversion is already in progress.")]
    Busy,

    /// A new file was selected while this request was in flight. Whatever
    /// the service answered has been discarded.
    ///
    /// Not posted as a notice; the newer selection owns the visible state.
    #[error("The conversion was superseded by a newer file selection.")]
    Superseded,
}

impl SubmitError {
    /// `true` for failures detected before any network call was made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingFile
                | Self::FormatMismatch { .. }
                | Self::MissingFormatSelection
                | Self::UnsupportedConversion { .. }
        )
    }
}

/// A failure reported by (or while talking to) the conversion service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The request did not complete within the configured timeout.
    #[error("Conversion request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Transport failure: DNS, TLS, connection reset.
    #[error("Network error: {reason}")]
    Network { reason: String },

    /// HTTP 401/403: the secret is missing, wrong, or out of credit.
    #[error("Authentication rejected by conversion service: {detail}")]
    Auth { detail: String },

    /// Any other non-success HTTP status.
    #[error("Conversion service returned HTTP {status}: {message}")]
    Remote {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Invalid response from conversion service: {detail}")]
    InvalidResponse { detail: String },
}

/// Fatal errors returned by file loading, client construction and downloads.
#[derive(Debug, Error)]
pub enum FileConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but reading it failed.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Service errors ────────────────────────────────────────────────────
    /// No API secret was supplied.
    #[error("Conversion service is not configured.\n{hint}")]
    MissingSecret { hint: String },

    // ── Download errors ───────────────────────────────────────────────────
    /// Fetching the converted file failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Could not create or write the downloaded file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A string that is not one of the supported format codes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown format code '{0}'")]
pub struct ParseFormatError(pub String);
