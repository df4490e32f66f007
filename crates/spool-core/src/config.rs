//! Queue configuration, loadable from TOML.
//!
//! ```toml
//! capacity = 100
//! timeout_secs = 120
//! poll_interval_ms = 500
//!
//! [executor]
//! kind = "pooled"   # or "inline"
//! workers = 8       # optional, defaults to capacity
//! ```
//!
//! Every top-level key is optional; an `[executor]` table needs `kind`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::queue::{DEFAULT_CAPACITY, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutorConfig {
    Pooled {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        workers: Option<usize>,
    },
    Inline,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig::Pooled { workers: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    pub capacity: usize,
    pub timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub executor: ExecutorConfig,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            executor: ExecutorConfig::default(),
        }
    }
}

impl QueueConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid("capacity must be at least 1".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be at least 1".into(),
            ));
        }
        if let ExecutorConfig::Pooled { workers: Some(0) } = self.executor {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_document_uses_defaults() {
        let config = QueueConfig::from_toml_str("").unwrap();
        assert_eq!(config, QueueConfig::default());
        assert_eq!(config.capacity, 100);
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.executor, ExecutorConfig::Pooled { workers: None });
    }

    #[test]
    fn full_document_is_parsed() {
        let config = QueueConfig::from_toml_str(
            r#"
            capacity = 8
            timeout_secs = 30
            poll_interval_ms = 50

            [executor]
            kind = "pooled"
            workers = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.capacity, 8);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
        assert_eq!(config.executor, ExecutorConfig::Pooled { workers: Some(4) });
    }

    #[rstest]
    #[case::zero_capacity("capacity = 0")]
    #[case::zero_poll("poll_interval_ms = 0")]
    #[case::zero_workers("[executor]\nkind = \"pooled\"\nworkers = 0")]
    fn invalid_values_are_rejected(#[case] doc: &str) {
        let err = QueueConfig::from_toml_str(doc).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[rstest]
    #[case::unknown_key("capacityy = 3")]
    #[case::wrong_type("capacity = \"many\"")]
    #[case::unknown_executor("[executor]\nkind = \"gpu\"")]
    fn malformed_documents_are_parse_errors(#[case] doc: &str) {
        let err = QueueConfig::from_toml_str(doc).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = QueueConfig::load("/nonexistent/spool.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/spool.toml"));
    }
}
