// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_LOG_FILTER, DEFAULT_MAX_MESSAGE_BYTES, MIN_MAX_MESSAGE_BYTES};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Settings for one worker process.
///
/// Every field is optional; a missing file section falls back to the defaults below,
/// which keep the channel behaviour of a bare worker (block forever on `read`).
///
/// # Example
/// ```yaml
/// read_timeout_seconds: 30
/// max_message_bytes: 65536
/// log_filter: "the_spigot=debug"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Give up on the parent after this long without any message (heartbeats count).
    pub read_timeout_seconds: Option<u64>,
    /// Largest accepted inbound line, in bytes.
    pub max_message_bytes: Option<usize>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl WorkerConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_seconds.map(Duration::from_secs)
    }

    pub fn get_max_message_bytes(&self) -> usize {
        self.max_message_bytes.unwrap_or(DEFAULT_MAX_MESSAGE_BYTES)
    }

    pub fn get_log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Rejects values the channel cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_timeout_seconds == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "read_timeout_seconds",
                reason: "must be at least 1; omit it to wait forever".to_string(),
            });
        }
        if let Some(max) = self.max_message_bytes {
            if max < MIN_MAX_MESSAGE_BYTES {
                return Err(ConfigError::InvalidValue {
                    field: "max_message_bytes",
                    reason: format!("{} is below the minimum of {}", max, MIN_MAX_MESSAGE_BYTES),
                });
            }
        }
        Ok(())
    }
}

/// Load a worker config from a YAML or TOML file (chosen by extension, YAML otherwise)
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<WorkerConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    if is_toml {
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load and validate a worker config
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<WorkerConfig, ConfigError> {
    let cfg = load_config(path)?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_block_forever() {
        let cfg = WorkerConfig::default();
        assert_eq!(cfg.read_timeout(), None);
        assert_eq!(cfg.get_max_message_bytes(), DEFAULT_MAX_MESSAGE_BYTES);
        assert_eq!(cfg.get_log_filter(), "info");
    }

    #[test]
    fn parse_yaml_config() {
        let file = write_temp(
            ".yaml",
            r#"
read_timeout_seconds: 30
max_message_bytes: 65536
log_filter: "the_spigot=debug"
"#,
        );
        let cfg = load_and_validate_config(file.path()).unwrap();
        assert_eq!(cfg.read_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(cfg.get_max_message_bytes(), 65536);
        assert_eq!(cfg.get_log_filter(), "the_spigot=debug");
    }

    #[test]
    fn parse_toml_config() {
        let file = write_temp(".toml", "read_timeout_seconds = 5\n");
        let cfg = load_and_validate_config(file.path()).unwrap();
        assert_eq!(cfg.read_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn empty_yaml_mapping_uses_defaults() {
        let file = write_temp(".yaml", "{}\n");
        let cfg = load_and_validate_config(file.path()).unwrap();
        assert_eq!(cfg, WorkerConfig::default());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let file = write_temp(".yml", "read_timeout_seconds: 0\n");
        let err = load_and_validate_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("read_timeout_seconds"));
    }

    #[test]
    fn tiny_message_limit_is_rejected() {
        let cfg = WorkerConfig {
            max_message_bytes: Some(10),
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { field: "max_message_bytes", .. })
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let file = write_temp(".yaml", "strategy: work_queue\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
