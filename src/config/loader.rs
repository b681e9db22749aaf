//! Script retrieval.
//!
//! Scripts normally live on a Skriptor server and are addressed by code
//! (`GET {server}/api/cli/{code}`, answering `{"config": "<yaml>"}`). A local
//! YAML file can be used instead.

use std::path::PathBuf;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{parse_script, parse_script_str, ConfigError, ScriptConfig};
use crate::settings::Settings;

/// Where a script comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Script stored on the server under this code
    Remote(String),
    /// YAML file on disk
    File(PathBuf),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(code) => write!(f, "{code}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetches and parses scripts.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    client: Client,
    server_url: Option<String>,
}

impl ConfigLoader {
    /// Create a loader from settings.
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(settings.http_timeout()).build()?;
        Ok(Self { client, server_url: settings.server_url.clone() })
    }

    /// Use a specific server instead of the configured one.
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Load a script from `source`.
    pub async fn load(&self, source: &ConfigSource) -> Result<ScriptConfig, ConfigError> {
        let result = match source {
            ConfigSource::Remote(code) => {
                let yaml = self.fetch(code).await?;
                parse_script_str(&yaml)
            }
            ConfigSource::File(path) => parse_script(path),
        };

        if let Err(ref e) = result {
            tracing::error!(source = %source, error = %e, "Error loading configuration");
        }
        result
    }

    /// Fetch the YAML text of a remote script.
    pub async fn fetch(&self, code: &str) -> Result<String, ConfigError> {
        let base = self.server_url.as_deref().ok_or(ConfigError::MissingServerUrl)?;
        let url = script_url(base, code);

        tracing::debug!(url = %url, "Fetching configuration");
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ConfigError::NotFound(code.to_string())),
            status if status.is_success() => {
                let body: ConfigResponse = response.json().await?;
                Ok(body.config)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ConfigError::Status { status: status.as_u16(), body })
            }
        }
    }
}

/// Server payload for a script.
#[derive(Debug, Deserialize)]
struct ConfigResponse {
    config: String,
}

/// Build the URL of a script, encoding each path segment of the code.
fn script_url(base: &str, code: &str) -> String {
    let encoded = code
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/api/cli/{}", base.trim_end_matches('/'), encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_url() {
        assert_eq!(script_url("https://skriptor.dev", "hello"), "https://skriptor.dev/api/cli/hello");
        assert_eq!(script_url("https://skriptor.dev/", "team/my app"), "https://skriptor.dev/api/cli/team/my%20app");
    }

    #[tokio::test]
    async fn test_remote_without_server_url() {
        let loader = ConfigLoader::new(&Settings::default()).unwrap();
        let err = loader.load(&ConfigSource::Remote("x".into())).await.unwrap_err();
        assert!(matches!(err, ConfigError::MissingServerUrl));
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("setup.yml");
        std::fs::write(&path, "project: { name: demo }\nsteps: []\n").unwrap();

        let loader = ConfigLoader::new(&Settings::default()).unwrap();
        let config = loader.load(&ConfigSource::File(path)).await.unwrap();

        assert_eq!(config.project["name"], "demo");
    }

    #[test]
    fn test_source_display() {
        assert_eq!(ConfigSource::Remote("abc".into()).to_string(), "abc");
        assert_eq!(ConfigSource::File(PathBuf::from("a/b.yml")).to_string(), "a/b.yml");
    }
}
