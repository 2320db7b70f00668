//! TripGuide configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `backend.base-url`
pub const BASE_URL_ENV: &str = "TRIPGUIDE_API_BASE_URL";

/// Main TripGuide configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend connection settings
    pub backend: BackendConfig,

    /// Conversation texts
    pub chat: ChatConfig,

    /// Debug switches
    pub debug: DebugConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file_chain(config_path)?;
        config.apply_env(std::env::var(BASE_URL_ENV).ok());
        Ok(config)
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed here; the full load reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load_file_chain(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_file_chain(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .tripguide.yml
        let local_config = PathBuf::from(".tripguide.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/tripguide/tripguide.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tripguide").join("tripguide.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply environment overrides (base URL)
    fn apply_env(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            tracing::info!("Using backend base URL from {}: {}", BASE_URL_ENV, url);
            self.backend.base_url = url;
        }
    }
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the trip-planning backend
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Interval between job status checks in milliseconds
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Endpoints that answer with a job id instead of a final answer
    #[serde(rename = "job-endpoints")]
    pub job_endpoints: Vec<String>,

    /// Ask for the access password before starting a session
    #[serde(rename = "require-password")]
    pub require_password: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: 300_000,
            poll_interval_ms: 2000,
            job_endpoints: vec!["/utility_itinerary".to_string(), "/plan_trip".to_string()],
            require_password: true,
        }
    }
}

/// Fixed conversation texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// First assistant message of every session
    #[serde(rename = "welcome-message")]
    pub welcome_message: String,

    /// Appended when the guided questions end without a backend answer
    #[serde(rename = "completion-message")]
    pub completion_message: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            welcome_message: "Hi! I am your Road Trip assistant. I will guide you through a few questions.".to_string(),
            completion_message: "Thanks - that completes the guided questions.".to_string(),
        }
    }
}

/// Debug switches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Write every conversation to ~/.tripguide/conversations as JSONL
    #[serde(rename = "log-conversations")]
    pub log_conversations: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.poll_interval_ms, 2000);
        assert!(config.backend.require_password);
        assert!(!config.debug.log_conversations);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_default_job_endpoints() {
        let config = BackendConfig::default();
        assert!(config.job_endpoints.iter().any(|e| e == "/utility_itinerary"));
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug

backend:
  base-url: https://trips.example.com
  timeout-ms: 60000
  poll-interval-ms: 500
  job-endpoints:
    - /plan
  require-password: false

chat:
  welcome-message: Hello traveller
  completion-message: All set

debug:
  log-conversations: true
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.backend.base_url, "https://trips.example.com");
        assert_eq!(config.backend.timeout_ms, 60000);
        assert_eq!(config.backend.poll_interval_ms, 500);
        assert_eq!(config.backend.job_endpoints, vec!["/plan".to_string()]);
        assert!(!config.backend.require_password);
        assert_eq!(config.chat.welcome_message, "Hello traveller");
        assert!(config.debug.log_conversations);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
backend:
  poll-interval-ms: 250
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.backend.poll_interval_ms, 250);

        // Defaults for unspecified
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.chat, ChatConfig::default());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log-level: warn\nbackend:\n  base-url: http://10.0.0.2:9000").unwrap();
        let path = file.path().to_path_buf();

        let config = Config::load_file_chain(Some(&path)).unwrap();
        assert_eq!(config.backend.base_url, "http://10.0.0.2:9000");
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/nonexistent/tripguide.yml");
        assert!(Config::load_file_chain(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.apply_env(Some("http://override:1234".to_string()));
        assert_eq!(config.backend.base_url, "http://override:1234");

        config.apply_env(Some("   ".to_string()));
        assert_eq!(config.backend.base_url, "http://override:1234");

        config.apply_env(None);
        assert_eq!(config.backend.base_url, "http://override:1234");
    }
}
