//! Ingestion configuration, persisted as TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading, saving or validating a configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(ixbrl::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}")]
    #[diagnostic(
        code(ixbrl::config::parse),
        help("Check the TOML syntax and the value types of each key.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(ixbrl::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config value for `{key}`: {message}")]
    #[diagnostic(code(ixbrl::config::invalid))]
    Invalid { key: &'static str, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Settings for one ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Host of the remote ingestion API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Prepended to every endpoint path.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Bearer token, sent as `Authorization` when set.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Extension of the archives picked up by the directory scan.
    #[serde(default = "default_archive_extension")]
    pub archive_extension: String,
    /// Root for scratch directories; next to each archive when unset.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
    /// Concurrent pushes per document.
    #[serde(default = "default_push_workers")]
    pub push_workers: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Retries after a transport error or a 5xx response.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".into()
}
fn default_api_prefix() -> String {
    "/api/v1".into()
}
fn default_archive_extension() -> String {
    "zip".into()
}
fn default_push_workers() -> usize {
    8
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_backoff_ms() -> u64 {
    250
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_prefix: default_api_prefix(),
            api_key: None,
            archive_extension: default_archive_extension(),
            scratch_dir: None,
            push_workers: default_push_workers(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl IngestConfig {
    /// Base URL plus prefix, without a trailing slash.
    pub fn api_root(&self) -> String {
        format!(
            "{}{}",
            self.api_base_url.trim_end_matches('/'),
            self.api_prefix.trim_end_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "api_base_url",
                message: "must not be empty".into(),
            });
        }
        if self.push_workers == 0 {
            return Err(ConfigError::Invalid {
                key: "push_workers",
                message: "at least one worker is required".into(),
            });
        }
        if self.archive_extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::Invalid {
                key: "archive_extension",
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Load and validate a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = IngestConfig::default();
        assert_eq!(cfg.api_root(), "http://localhost:8000/api/v1");
        assert_eq!(cfg.push_workers, 8);
        assert_eq!(cfg.archive_extension, "zip");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("ingest.toml");

        let cfg = IngestConfig {
            api_key: Some("secret".into()),
            push_workers: 3,
            ..Default::default()
        };
        cfg.save(&path).unwrap();

        let loaded = IngestConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_takes_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("ingest.toml");
        std::fs::write(&path, "api_base_url = \"http://api:9000/\"\n").unwrap();

        let loaded = IngestConfig::load(&path).unwrap();
        assert_eq!(loaded.api_root(), "http://api:9000/api/v1");
        assert_eq!(loaded.max_retries, 2);
    }

    #[test]
    fn zero_workers_rejected() {
        let cfg = IngestConfig {
            push_workers: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { key: "push_workers", .. })
        ));
    }

    #[test]
    fn empty_base_url_rejected() {
        let cfg = IngestConfig {
            api_base_url: " ".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
