//! Configuration for the conversion client and controller.
//!
//! Everything tunable lives in [`ConverterConfig`], built via its
//! [`ConverterConfigBuilder`]. The same struct configures the ConvertAPI
//! client, the downloader and the controller defaults, so one value can be
//! threaded through the whole stack.

use crate::error::FileConvertError;
use crate::format::Format;
use crate::validate::FormatSelection;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default ConvertAPI endpoint.
pub const DEFAULT_BASE_URL: &str = "https://v2.convertapi.com";

/// Environment variable holding the API secret.
pub const SECRET_ENV: &str = "CONVERT_API_SECRET";

/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "CONVERT_API_BASE_URL";

/// Configuration for a conversion session.
///
/// # Example
/// ```rust
/// use fileconvert::{ConverterConfig, Format};
///
/// let config = ConverterConfig::builder()
///     .api_secret("my-secret")
///     .default_target(Some(Format::Docx))
///     .error_display_secs(8)
///     .build()
///     .unwrap();
/// assert_eq!(config.error_display_secs, 8);
/// ```
#[derive(Clone)]
pub struct ConverterConfig {
    /// ConvertAPI secret. Required to build a [`crate::service::ConvertApiClient`].
    pub api_secret: Option<String>,

    /// Service root, without trailing slash. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Whole-request timeout for service calls. Default: none, so only the
    /// HTTP client's connection limits apply.
    pub request_timeout_secs: Option<u64>,

    /// How long a failure message stays visible. Default: 5.
    pub error_display_secs: u64,

    /// Where downloaded results are written. Default: current directory.
    pub download_dir: PathBuf,

    /// Source format selected on start and after each download. Default: PDF.
    pub default_source: Option<Format>,

    /// Target format selected on start and after each download. Default: none.
    pub default_target: Option<Format>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            api_secret: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            error_display_secs: 5,
            download_dir: PathBuf::from("."),
            default_source: Some(Format::Pdf),
            default_target: None,
        }
    }
}

impl fmt::Debug for ConverterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterConfig")
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("error_display_secs", &self.error_display_secs)
            .field("download_dir", &self.download_dir)
            .field("default_source", &self.default_source)
            .field("default_target", &self.default_target)
            .finish()
    }
}

impl ConverterConfig {
    /// Create a new builder for `ConverterConfig`.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults, with the secret and base URL taken from the environment
    /// when set and non-empty.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(secret) = non_empty_env(SECRET_ENV) {
            config.api_secret = Some(secret);
        }
        if let Some(url) = non_empty_env(BASE_URL_ENV) {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        config
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_secs(self.error_display_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// The selection a fresh session starts with.
    pub fn default_selection(&self) -> FormatSelection {
        FormatSelection::new(self.default_source, self.default_target)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Check if the input string looks like an HTTP(S) URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn api_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.api_secret = Some(secret.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn request_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn error_display_secs(mut self, secs: u64) -> Self {
        self.config.error_display_secs = secs;
        self
    }

    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.download_dir = dir.into();
        self
    }

    pub fn default_source(mut self, format: Option<Format>) -> Self {
        self.config.default_source = format;
        self
    }

    pub fn default_target(mut self, format: Option<Format>) -> Self {
        self.config.default_target = format;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConverterConfig, FileConvertError> {
        let c = &self.config;
        if !is_url(&c.base_url) {
            return Err(FileConvertError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.error_display_secs == 0 {
            return Err(FileConvertError::InvalidConfig(
                "error display window must be ≥ 1 second".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(FileConvertError::InvalidConfig(
                "request timeout must be ≥ 1 second when set".into(),
            ));
        }
        Ok(self.config)
    }
}
