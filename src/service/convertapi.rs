//! ConvertAPI (`v2.convertapi.com`) implementation of [`ConversionService`].
//!
//! One call is one `POST /convert/{from}/to/{to}` with a multipart body:
//!
//! ```text
//! File       <bytes, filename>
//! StoreFile  true              ← ask for hosted URLs instead of inline data
//! <extra>    <value>           ← e.g. scale=true for PNG → JPG
//! ```
//!
//! The secret goes in a bearer `Authorization` header.

use super::{ConversionService, OutputFile};
use crate::config::ConverterConfig;
use crate::error::{FileConvertError, ServiceError};
use crate::format::Format;
use crate::params::{ConversionParams, FILE_PARAM};
use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use tracing::debug;

/// HTTP client for ConvertAPI.
pub struct ConvertApiClient {
    client: Client,
    base_url: String,
    secret: String,
    timeout_secs: Option<u64>,
}

impl fmt::Debug for ConvertApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertApiClient")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl ConvertApiClient {
    /// Build a client from `config`. Fails when no secret is configured.
    pub fn new(config: &ConverterConfig) -> Result<Self, FileConvertError> {
        let secret = config
            .api_secret
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| FileConvertError::MissingSecret {
                hint: format!(
                    "Set {} or pass --api-secret with your ConvertAPI secret.",
                    crate::config::SECRET_ENV
                ),
            })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FileConvertError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            secret,
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn endpoint(&self, from: Format, to: Format) -> String {
        endpoint_url(&self.base_url, from, to)
    }
}

#[async_trait]
impl ConversionService for ConvertApiClient {
    fn name(&self) -> &str {
        "convertapi"
    }

    async fn convert(
        &self,
        from: Format,
        to: Format,
        params: ConversionParams,
    ) -> Result<Vec<OutputFile>, ServiceError> {
        let url = self.endpoint(from, to);
        debug!("POST {} ({} extra params)", url, params.extra().len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret)
            .multipart(build_form(&params))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(error_from_response(status, &body));
        }
        parse_files(&body)
    }
}

impl ConvertApiClient {
    fn transport_error(&self, e: reqwest::Error) -> ServiceError {
        match (e.is_timeout(), self.timeout_secs) {
            (true, Some(secs)) => ServiceError::Timeout { secs },
            _ => ServiceError::Network {
                reason: e.to_string(),
            },
        }
    }
}

fn endpoint_url(base_url: &str, from: Format, to: Format) -> String {
    format!(
        "{}/convert/{}/to/{}",
        base_url.trim_end_matches('/'),
        from.api_code(),
        to.api_code()
    )
}

fn build_form(params: &ConversionParams) -> multipart::Form {
    let file = params.file();
    let part = multipart::Part::bytes(file.content().to_vec()).file_name(file.name().to_string());
    let mut form = multipart::Form::new()
        .part(FILE_PARAM, part)
        .text("StoreFile", "true");
    for (name, value) in params.extra() {
        form = form.text(name.clone(), value.clone());
    }
    form
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ConvertResponse {
    #[serde(default)]
    files: Vec<ApiFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiFile {
    url: String,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

fn parse_files(body: &str) -> Result<Vec<OutputFile>, ServiceError> {
    let parsed: ConvertResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::InvalidResponse {
            detail: e.to_string(),
        })?;
    Ok(parsed
        .files
        .into_iter()
        .map(|f| OutputFile {
            url: f.url,
            file_name: f.file_name,
            file_size: f.file_size,
        })
        .collect())
}

fn error_from_response(status: StatusCode, body: &str) -> ServiceError {
    let api: Option<ApiError> = serde_json::from_str(body).ok();
    let code = api.as_ref().and_then(|a| a.code);
    let message = api
        .and_then(|a| a.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Auth { detail: message },
        _ => ServiceError::Remote {
            status: status.as_u16(),
            code,
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::SelectedFile;
    use crate::testing::http::FakeServer;

    #[test]
    fn endpoint_uses_lowercase_codes() {
        assert_eq!(
            endpoint_url("https://v2.convertapi.com/", Format::Docx, Format::Pdf),
            "https://v2.convertapi.com/convert/docx/to/pdf"
        );
    }

    #[test]
    fn client_requires_secret() {
        let err = ConvertApiClient::new(&ConverterConfig::default()).unwrap_err();
        assert!(matches!(err, FileConvertError::MissingSecret { .. }));

        let blank = ConverterConfig {
            api_secret: Some("   ".into()),
            ..ConverterConfig::default()
        };
        assert!(ConvertApiClient::new(&blank).is_err());
    }

    #[test]
    fn client_debug_hides_secret() {
        let config = ConverterConfig::builder().api_secret("abc123").build().unwrap();
        let client = ConvertApiClient::new(&config).unwrap();
        assert!(!format!("{client:?}").contains("abc123"));
        assert_eq!(client.name(), "convertapi");
    }

    #[test]
    fn parses_files_in_order() {
        let body = r#"{
            "ConversionCost": 1,
            "Files": [
                {"FileName":"report.docx","FileExt":"docx","FileSize":2048,"FileId":"a1","Url":"https://v2.convertapi.com/d/a1/report.docx"},
                {"FileName":"report-2.docx","FileExt":"docx","FileSize":10,"FileId":"b2","Url":"https://v2.convertapi.com/d/b2/report-2.docx"}
            ]
        }"#;
        let files = parse_files(body).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].url, "https://v2.convertapi.com/d/a1/report.docx");
        assert_eq!(files[0].file_name.as_deref(), Some("report.docx"));
        assert_eq!(files[0].file_size, Some(2048));
    }

    #[test]
    fn missing_files_array_is_empty_result() {
        assert!(parse_files(r#"{"ConversionCost":0}"#).unwrap().is_empty());
    }

    #[test]
    fn garbage_body_is_invalid_response() {
        let err = parse_files("<html>oops</html>").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse { .. }));
    }

    #[test]
    fn unauthorized_maps_to_auth() {
        let err = error_from_response(
            StatusCode::UNAUTHORIZED,
            r#"{"Code":4013,"Message":"Invalid secret"}"#,
        );
        assert_eq!(
            err,
            ServiceError::Auth {
                detail: "Invalid secret".into()
            }
        );
    }

    #[test]
    fn other_status_maps_to_remote() {
        let err = error_from_response(
            StatusCode::BAD_REQUEST,
            r#"{"Code":5001,"Message":"Unable to convert"}"#,
        );
        assert_eq!(
            err,
            ServiceError::Remote {
                status: 400,
                code: Some(5001),
                message: "Unable to convert".into()
            }
        );

        let err = error_from_response(StatusCode::BAD_GATEWAY, "");
        assert!(
            matches!(&err, ServiceError::Remote { status: 502, code: None, message } if message == "Bad Gateway"),
            "got: {err:?}"
        );
    }

    fn client_for(base_url: &str) -> ConvertApiClient {
        let config = ConverterConfig::builder()
            .api_secret("s3cr3t")
            .base_url(base_url)
            .build()
            .unwrap();
        ConvertApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn convert_posts_multipart_with_bearer_secret() {
        let server = FakeServer::respond(
            200,
            "application/json",
            r#"{"ConversionCost":1,"Files":[{"FileName":"a.jpg","FileExt":"jpg","FileSize":3,"FileId":"x","Url":"https://v2.convertapi.com/d/x/a.jpg"}]}"#,
        )
        .await;
        let client = client_for(&server.base_url);
        let params = ConversionParams::for_pair(
            SelectedFile::new("a.png", b"PNGDATA".to_vec()),
            Format::Png,
            Format::Jpg,
        );

        let files = client.convert(Format::Png, Format::Jpg, params).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].url, "https://v2.convertapi.com/d/x/a.jpg");
        assert_eq!(files[0].file_name.as_deref(), Some("a.jpg"));

        let req = server.request().await;
        assert_eq!(req.request_line(), "POST /convert/png/to/jpg HTTP/1.1");
        assert_eq!(req.header("authorization"), Some("Bearer s3cr3t"));

        let (headers, bytes) = req.form_field("File").expect("File part");
        assert!(headers.contains(r#"filename="a.png""#), "headers: {headers}");
        assert_eq!(bytes, b"PNGDATA");
        assert_eq!(req.form_field("StoreFile").unwrap().1, b"true");
        assert_eq!(req.form_field("scale").unwrap().1, b"true");
    }

    #[tokio::test]
    async fn convert_without_extras_sends_no_scale() {
        let server = FakeServer::respond(200, "application/json", r#"{"Files":[]}"#).await;
        let client = client_for(&server.base_url);
        let params = ConversionParams::for_pair(
            SelectedFile::new("notes.txt", b"hi".to_vec()),
            Format::Txt,
            Format::Pdf,
        );

        let files = client.convert(Format::Txt, Format::Pdf, params).await.unwrap();
        assert!(files.is_empty());

        let req = server.request().await;
        assert_eq!(req.request_line(), "POST /convert/txt/to/pdf HTTP/1.1");
        assert!(req.form_field("scale").is_none());
        assert!(req.form_field("StoreFile").is_some());
    }

    #[tokio::test]
    async fn convert_maps_401_to_auth() {
        let server =
            FakeServer::respond(401, "application/json", r#"{"Code":4013,"Message":"bad"}"#).await;
        let client = client_for(&server.base_url);
        let params = ConversionParams::new(SelectedFile::new("a.pdf", b"%PDF".to_vec()));

        let err = client
            .convert(Format::Pdf, Format::Docx, params)
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::Auth { detail: "bad".into() });
        server.request().await;
    }

    #[tokio::test]
    async fn convert_maps_server_error_without_json_to_remote() {
        let server = FakeServer::respond(500, "text/html", "<h1>down</h1>").await;
        let client = client_for(&server.base_url);
        let params = ConversionParams::new(SelectedFile::new("a.pdf", b"%PDF".to_vec()));

        let err = client
            .convert(Format::Pdf, Format::Txt, params)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Remote {
                status: 500,
                code: None,
                message: "Internal Server Error".into()
            }
        );
        server.request().await;
    }

    #[tokio::test]
    async fn unreachable_service_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = client_for(&base_url);
        let params = ConversionParams::new(SelectedFile::new("a.pdf", b"%PDF".to_vec()));
        let err = client
            .convert(Format::Pdf, Format::Txt, params)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Network { .. }), "got: {err:?}");
    }
}
