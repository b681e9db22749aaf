//! Log upload.
//!
//! After a run the log file can be posted to the server so the script's
//! author can debug it.

use std::fmt;
use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::settings::Settings;

/// Outcome reported alongside an uploaded log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    /// Wire form of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upload error types.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("SKRIPTOR_URL is not set in the environment variables or settings")]
    MissingServerUrl,

    #[error("Failed to read log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("No response received from the server: {0}")]
    NoResponse(#[source] reqwest::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Posts run logs to `{server}/api/upload-logs`.
#[derive(Debug, Clone)]
pub struct LogUploader {
    client: Client,
    server_url: String,
}

impl LogUploader {
    /// Create an uploader from settings.
    pub fn new(settings: &Settings) -> Result<Self, UploadError> {
        let server_url = settings.server_url.clone().ok_or(UploadError::MissingServerUrl)?;
        let client = Client::builder()
            .timeout(settings.http_timeout())
            .build()
            .map_err(UploadError::Client)?;
        Ok(Self { client, server_url })
    }

    /// Upload the log at `path` for a run of `code`.
    ///
    /// Only `201 Created` counts as success.
    pub async fn upload(&self, path: &Path, code: &str, status: RunStatus) -> Result<(), UploadError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "run.log".to_string(), |n| n.to_string_lossy().into_owned());

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("script-code", code.to_string())
            .text("script-status", status.as_str());

        let url = format!("{}/api/upload-logs", self.server_url.trim_end_matches('/'));
        tracing::debug!(url = %url, code, status = %status, "Uploading log");

        let response =
            self.client.post(&url).multipart(form).send().await.map_err(UploadError::NoResponse)?;

        if response.status() != StatusCode::CREATED {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Status { status, body });
        }

        tracing::info!(path = %path.display(), "Log file uploaded");
        Ok(())
    }
}
