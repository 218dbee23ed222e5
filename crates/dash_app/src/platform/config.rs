use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use dash_core::TICK_PERIOD;
use engine_logging::LogDestination;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_SERVER: &str = "ws://127.0.0.1:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid server url `{url}`: {source}")]
    InvalidServer {
        url: String,
        source: url::ParseError,
    },
    #[error("invalid log level `{0}`")]
    InvalidLogLevel(String),
    #[error("tick period must be positive")]
    ZeroTickPeriod,
}

/// Where log output goes, as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogTarget {
    #[default]
    Terminal,
    File(PathBuf),
    Both(PathBuf),
}

/// Contents of the RON config file. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: String,
    pub initial_path: String,
    pub tick_period_ms: u64,
    pub log_level: String,
    pub log: LogTarget,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            initial_path: "/".to_string(),
            tick_period_ms: TICK_PERIOD.as_millis() as u64,
            log_level: "info".to_string(),
            log: LogTarget::Terminal,
        }
    }
}

/// Validated settings the app runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server: Url,
    pub initial_path: String,
    pub tick_period: Duration,
    pub log_level: LevelFilter,
    pub log_destination: LogDestination,
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn resolve(self) -> Result<Settings, ConfigError> {
        let server = Url::parse(&self.server).map_err(|source| ConfigError::InvalidServer {
            url: self.server.clone(),
            source,
        })?;
        let log_level = LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))?;
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        let log_destination = match self.log {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File(path) => LogDestination::File(path),
            LogTarget::Both(path) => LogDestination::Both(path),
        };
        Ok(Settings {
            server,
            initial_path: self.initial_path,
            tick_period: Duration::from_millis(self.tick_period_ms),
            log_level,
            log_destination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.ron");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn defaults_resolve_to_local_server() {
        let settings = DashboardConfig::default().resolve().unwrap();
        assert_eq!(settings.server.as_str(), "ws://127.0.0.1:8080/");
        assert_eq!(settings.initial_path, "/");
        assert_eq!(settings.tick_period, TICK_PERIOD);
        assert_eq!(settings.log_level, LevelFilter::Info);
        assert_eq!(settings.log_destination, LogDestination::Terminal);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let (_dir, path) =
            write_config(r#"(server: "http://ci.local:8080", log: Both("dash.log"))"#);
        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.server, "http://ci.local:8080");
        assert_eq!(config.initial_path, "/");
        assert_eq!(config.log, LogTarget::Both(PathBuf::from("dash.log")));
    }

    #[test]
    fn full_file_round_trips_into_settings() {
        let (_dir, path) = write_config(
            r#"(
                server: "wss://ci.example.com",
                initial_path: "/jobs/build",
                tick_period_ms: 500,
                log_level: "debug",
                log: File("/tmp/dash.log"),
            )"#,
        );
        let settings = DashboardConfig::load(&path).unwrap().resolve().unwrap();
        assert_eq!(settings.server.scheme(), "wss");
        assert_eq!(settings.initial_path, "/jobs/build");
        assert_eq!(settings.tick_period, Duration::from_millis(500));
        assert_eq!(settings.log_level, LevelFilter::Debug);
        assert_eq!(
            settings.log_destination,
            LogDestination::File(PathBuf::from("/tmp/dash.log"))
        );
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DashboardConfig::load(&dir.path().join("nope.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let (_dir, path) = write_config("(server: ");
        let err = DashboardConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn bad_values_are_rejected() {
        let config = DashboardConfig {
            server: "not a url".into(),
            ..DashboardConfig::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidServer { .. })
        ));

        let config = DashboardConfig {
            log_level: "loud".into(),
            ..DashboardConfig::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidLogLevel(level)) if level == "loud"
        ));

        let config = DashboardConfig {
            tick_period_ms: 0,
            ..DashboardConfig::default()
        };
        assert!(matches!(config.resolve(), Err(ConfigError::ZeroTickPeriod)));
    }
}
