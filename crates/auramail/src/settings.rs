//! Persistent settings and the stored credential.

use std::path::{Path, PathBuf};
use std::time::Duration;

use auramail_api::Token;
use auramail_core::ClientConfig;
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "auramail";

/// Application settings loaded from `settings.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend base URL.
    pub base_url: String,
    /// Messages per page.
    pub page_size: u32,
    /// Identity readiness poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: auramail_api::DEFAULT_BASE_URL.to_string(),
            page_size: 20,
            poll_interval_ms: 500,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Core client configuration derived from these settings.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_page_size(self.page_size.max(1))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms.max(1)))
    }

    /// Per-request timeout.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Default settings file location.
pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("settings.json")
}

/// Load application settings from file. A missing file yields defaults.
pub async fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let contents = tokio::fs::read_to_string(path).await?;
    let settings = serde_json::from_str(&contents)?;
    tracing::debug!("Settings loaded from {:?}", path);
    Ok(settings)
}

/// File holding the bearer token between runs.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store at an explicit path.
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store in the user's data directory.
    pub fn default_location() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("token");
        Self::new(path)
    }

    /// Reads the stored token, if any.
    pub async fn load(&self) -> Option<Token> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = Token::new(contents.trim());
                (!token.is_empty()).then_some(token)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read stored token: {}", e);
                None
            }
        }
    }

    /// Writes the token, replacing any previous one.
    pub async fn save(&self, token: &Token) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&self.path, token.as_str()).await?;
        tracing::debug!("Token saved to {:?}", self.path);
        Ok(())
    }

    /// Removes the stored token.
    pub async fn clear(&self) -> anyhow::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("auramail-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"base_url": "http://mail.local:8080"}"#).unwrap();
        assert_eq!(settings.base_url, "http://mail.local:8080");
        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(
            settings.client_config().poll_interval,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_zero_page_size_is_raised() {
        let settings = Settings {
            page_size: 0,
            ..Settings::default()
        };
        assert_eq!(settings.client_config().page_size, 1);
    }

    #[tokio::test]
    async fn test_missing_settings_file_gives_defaults() {
        let settings = load_settings(&scratch("missing.json")).await.unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let store = TokenStore::new(scratch("token"));
        store.save(&Token::new("abc123")).await.unwrap();
        assert_eq!(store.load().await.unwrap().as_str(), "abc123");
        store.clear().await.unwrap();
        assert!(store.load().await.is_none());
        store.clear().await.unwrap();
    }
}
