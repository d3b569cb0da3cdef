//! # fileconvert
//!
//! Pick a file, pick a source/target format pair, and let the ConvertAPI
//! cloud service do the conversion.
//!
//! The library does no format conversion itself. What it does own is the
//! request lifecycle around one remote call:
//!
//! ```text
//! select_file ─▶ set formats ─▶ submit_conversion ─▶ download_result
//!                                   │
//!                                   ├─ 1. file selected?
//!                                   ├─ 2. extension == source format?
//!                                   ├─ 3. both formats chosen?
//!                                   ├─ 4. pair in compatibility table?
//!                                   └─ 5. POST to the service, keep first URL
//! ```
//!
//! Every failure becomes a single user-facing message that clears itself
//! after five seconds.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fileconvert::{
//!     ConversionController, ConvertApiClient, ConverterConfig, Format, HttpDownloader,
//!     SelectedFile,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Secret from CONVERT_API_SECRET
//!     let config = ConverterConfig::from_env();
//!     let controller = ConversionController::new(
//!         &config,
//!         Arc::new(ConvertApiClient::new(&config)?),
//!         Arc::new(HttpDownloader::new(&config)?),
//!     );
//!
//!     controller.select_file(SelectedFile::from_path("report.docx").await?);
//!     controller.set_source_format(Some(Format::Docx));
//!     controller.set_target_format(Some(Format::Pdf));
//!
//!     let url = controller.submit_conversion().await?;
//!     println!("converted: {url}");
//!     if let Some(path) = controller.download_result().await? {
//!         println!("saved to {}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `fileconvert` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! ## Permitted conversions
//!
//! | From | To |
//! |------|----|
//! | DOCX | PDF, TXT |
//! | PDF  | DOCX, JPG, TXT |
//! | PNG  | JPG, PDF |
//! | JPG  | PNG, PDF |
//! | XLSX | PDF, CSV |
//! | TXT  | PDF |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod download;
pub mod error;
pub mod file;
pub mod format;
pub mod notice;
pub mod params;
pub mod progress;
pub mod service;
pub mod testing;
pub mod validate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConverterConfig, ConverterConfigBuilder};
pub use controller::{ControllerSnapshot, ConversionController};
pub use download::{HttpDownloader, ResultDownloader};
pub use error::{FileConvertError, ParseFormatError, ServiceError, SubmitError};
pub use file::SelectedFile;
pub use format::{CompatibilityTable, Format};
pub use notice::NoticeBoard;
pub use params::ConversionParams;
pub use progress::{ConversionObserver, NoopObserver, Observer};
pub use service::{ConversionService, ConvertApiClient, OutputFile};
pub use validate::{validate_submission, FormatSelection, ValidatedRequest};
