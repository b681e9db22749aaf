//! Settings for Skriptor.
//!
//! Settings are read from TOML, then overridden by environment variables
//! (a `.env` file is honoured by the binary). Collaborators receive these
//! settings explicitly instead of reading the environment themselves.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Server base URL.
pub const ENV_SERVER_URL: &str = "SKRIPTOR_URL";
/// Directory for run logs.
pub const ENV_LOG_DIR: &str = "SKRIPTOR_LOG_DIR";
/// Groq API key (preferred LLM provider).
pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";
/// OpenAI API key.
pub const ENV_OPENAI_API_KEY: &str = "OPEN_AI_API_KEY";

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the Skriptor server
    pub server_url: Option<String>,

    /// Directory where run logs are written
    pub log_dir: PathBuf,

    /// Timeout for HTTP requests in seconds
    pub http_timeout_secs: u64,

    /// LLM settings for `update_file`
    pub llm: LlmSettings,
}

/// LLM provider settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Groq API key; Groq is used when set
    pub groq_api_key: Option<String>,

    /// OpenAI API key; used when no Groq key is set
    pub openai_api_key: Option<String>,

    /// Model requested from Groq
    pub groq_model: String,

    /// Model requested from OpenAI
    pub openai_model: String,

    /// Completion token limit
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("LlmSettings")
            .field("groq_api_key", &redact(&self.groq_api_key))
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("groq_model", &self.groq_model)
            .field("openai_model", &self.openai_model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Settings {
    /// Load settings from the default locations plus the environment.
    ///
    /// Looks for settings in:
    /// 1. `.skriptor.toml` in current directory
    /// 2. `~/.config/skriptor/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        let settings = Self::load_file()?;
        Ok(settings.with_env(|key| std::env::var(key).ok()))
    }

    /// Load settings from the default locations, ignoring the environment.
    pub fn load_file() -> anyhow::Result<Self> {
        // Try local settings first
        let local = PathBuf::from(".skriptor.toml");
        if local.exists() {
            return Self::load_from_file(&local);
        }

        // Try global settings
        if let Some(config_dir) = Self::config_dir() {
            let global = config_dir.join("config.toml");
            if global.exists() {
                return Self::load_from_file(&global);
            }
        }

        Ok(Self::default())
    }

    /// Load settings from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Empty values are ignored.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_SERVER_URL) {
            self.server_url = Some(url);
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(key) = get(ENV_GROQ_API_KEY) {
            self.llm.groq_api_key = Some(key);
        }
        if let Some(key) = get(ENV_OPENAI_API_KEY) {
            self.llm.openai_api_key = Some(key);
        }
        self
    }

    /// HTTP request timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Get the settings directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("skriptor"))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: None,
            log_dir: PathBuf::from("logs"),
            http_timeout_secs: 60,
            llm: LlmSettings::default(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            openai_api_key: None,
            groq_model: "llama-3.1-70b-versatile".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            max_tokens: 4000,
            temperature: 0.4,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.server_url.is_none());
        assert_eq!(settings.log_dir, PathBuf::from("logs"));
        assert_eq!(settings.http_timeout(), Duration::from_secs(60));
        assert_eq!(settings.llm.max_tokens, 4000);
    }

    #[test]
    fn test_settings_deserialization() {
        let toml_str = r#"
            server_url = "https://skriptor.example.com"
            log_dir = "/var/log/skriptor"

            [llm]
            groq_model = "llama-3.3-70b"
            temperature = 0.1
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.server_url.as_deref(), Some("https://skriptor.example.com"));
        assert_eq!(settings.log_dir, PathBuf::from("/var/log/skriptor"));
        assert_eq!(settings.llm.groq_model, "llama-3.3-70b");
        assert_eq!(settings.llm.openai_model, "gpt-4o-mini");
        assert!((settings.llm.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_env_overrides() {
        let settings = Settings::default().with_env(env(&[
            (ENV_SERVER_URL, "http://localhost:3000"),
            (ENV_LOG_DIR, "/tmp/logs"),
            (ENV_GROQ_API_KEY, "gsk-test"),
            (ENV_OPENAI_API_KEY, ""),
        ]));

        assert_eq!(settings.server_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(settings.log_dir, PathBuf::from("/tmp/logs"));
        assert_eq!(settings.llm.groq_api_key.as_deref(), Some("gsk-test"));
        assert!(settings.llm.openai_api_key.is_none());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let settings = Settings::default().with_env(env(&[(ENV_OPENAI_API_KEY, "sk-secret")]));
        let debug = format!("{settings:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    #[serial_test::serial]
    fn test_load_reads_process_environment() {
        std::env::set_var(ENV_LOG_DIR, "/tmp/skriptor-env-logs");
        let settings = Settings::load();
        std::env::remove_var(ENV_LOG_DIR);

        assert_eq!(settings.unwrap().log_dir, PathBuf::from("/tmp/skriptor-env-logs"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "http_timeout_secs = 5\n").unwrap();

        let settings = Settings::load_from_file(&path).unwrap();
        assert_eq!(settings.http_timeout(), Duration::from_secs(5));
    }
}
