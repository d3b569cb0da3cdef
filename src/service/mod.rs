//! The external conversion service boundary.
//!
//! The controller only ever talks to a [`ConversionService`]; the production
//! implementation is [`ConvertApiClient`]. Tests substitute
//! [`crate::testing::MockConversionService`].

mod convertapi;

pub use convertapi::ConvertApiClient;

use crate::error::ServiceError;
use crate::format::Format;
use crate::params::ConversionParams;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One converted file as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    /// Where the converted file can be fetched.
    pub url: String,
    /// File name suggested by the service, if any.
    pub file_name: Option<String>,
    /// Size in bytes, if reported.
    pub file_size: Option<u64>,
}

impl OutputFile {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file_name: None,
            file_size: None,
        }
    }
}

/// Capability to convert a file from one format to another.
#[async_trait]
pub trait ConversionService: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Convert `params.file()` from `from` to `to`.
    ///
    /// An empty `Vec` is a successful call that produced nothing; the caller
    /// decides what that means.
    async fn convert(
        &self,
        from: Format,
        to: Format,
        params: ConversionParams,
    ) -> Result<Vec<OutputFile>, ServiceError>;
}
