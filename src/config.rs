use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("interval_minutes must be greater than zero")]
    ZeroInterval,
    #[error("interval_minutes {0} is too large")]
    IntervalTooLarge(u64),
    #[error("latency_threshold_ms must be greater than zero")]
    ZeroThreshold,
    #[error("urls[{0}] is empty")]
    EmptyUrl(usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub interval_minutes: u64,
    pub latency_threshold_ms: u64,
    pub urls: Vec<String>,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u64,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default)]
    pub status_api: StatusApiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub token: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for StatusApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_log_retention_days() -> u64 { 30 }
fn default_log_dir() -> PathBuf { PathBuf::from("logs") }
fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 8080 }

/// Telegram chat ids are often written as bare numbers in YAML.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_minutes == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.interval_minutes.checked_mul(60).is_none() {
            return Err(ConfigError::IntervalTooLarge(self.interval_minutes));
        }
        if self.latency_threshold_ms == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if let Some(idx) = self.urls.iter().position(|u| u.trim().is_empty()) {
            return Err(ConfigError::EmptyUrl(idx));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    pub fn telegram_credentials(&self) -> Option<(String, String)> {
        let telegram = self.notifier.telegram.as_ref()?;
        let token = telegram.token.as_deref().filter(|t| !t.is_empty())?;
        let chat_id = telegram.chat_id.as_deref().filter(|c| !c.is_empty())?;
        Some((token.to_string(), chat_id.to_string()))
    }
}
