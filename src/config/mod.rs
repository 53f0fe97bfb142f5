/// Configuration management for blockflow
///
/// Handles the backend endpoint, editor limits, and signing-flow polling.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workflow backend configuration
    pub api: ApiConfig,
    /// Graph editor configuration
    pub editor: EditorConfig,
    /// Transaction signing configuration
    pub signing: SigningConfig,
}

/// Workflow backend HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to (e.g., "http://localhost:3001/api/v1")
    pub base_url: String,
    /// Bearer token sent as `Authorization`, if any
    #[serde(default)]
    pub token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Graph editor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Maximum undo snapshots kept
    pub history_limit: usize,
}

/// Receipt polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Delay between receipt polls in milliseconds
    pub receipt_poll_ms: u64,
    /// Polls before giving up on a receipt
    pub receipt_max_attempts: u32,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    /// Default configuration with ENV_VAR support
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: std::env::var("BLOCKFLOW_API_URL")
                    .unwrap_or_else(|_| "http://localhost:3001/api/v1".to_string()),
                token: std::env::var("BLOCKFLOW_API_TOKEN").ok().filter(|t| !t.is_empty()),
                timeout_secs: env_or("BLOCKFLOW_HTTP_TIMEOUT_SECS", 30),
            },
            editor: EditorConfig {
                history_limit: env_or("BLOCKFLOW_HISTORY_LIMIT", 128),
            },
            signing: SigningConfig {
                receipt_poll_ms: env_or("BLOCKFLOW_RECEIPT_POLL_MS", 1000),
                receipt_max_attempts: env_or("BLOCKFLOW_RECEIPT_MAX_ATTEMPTS", 60),
            },
        }
    }
}

impl Config {
    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SigningConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_parses() {
        let dir = std::env::temp_dir().join(format!("blockflow-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(
            &path,
            r#"{
                "api": { "base_url": "https://api.example.com/v1", "timeout_secs": 5 },
                "editor": { "history_limit": 16 },
                "signing": { "receipt_poll_ms": 250, "receipt_max_attempts": 8 }
            }"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.api.base_url, "https://api.example.com/v1");
        assert!(config.api.token.is_none());
        assert_eq!(config.editor.history_limit, 16);
        assert_eq!(config.signing.poll_interval(), Duration::from_millis(250));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::from_file("/definitely/not/here.json").is_err());
    }
}
