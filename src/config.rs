//! Configuration for the study-scheduler binary.

use crate::error::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Cards requested per study session.
    #[serde(default = "default_session_size")]
    pub session_size: usize,
    /// `tracing_subscriber` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Directory the demo writes progress snapshots to, if any.
    #[serde(default)]
    pub progress_export_dir: Option<PathBuf>,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("study.sqlite3")
}

fn default_session_size() -> usize {
    20
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            session_size: default_session_size(),
            log_filter: default_log_filter(),
            progress_export_dir: None,
        }
    }
}

impl Config {
    /// Reads a TOML file. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SchedulerError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::from_toml("session_size = 5").unwrap();
        assert_eq!(config.session_size, 5);
        assert_eq!(config.database_path, PathBuf::from("study.sqlite3"));
        assert_eq!(config.log_filter, "info");
        assert!(config.progress_export_dir.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scheduler.toml");
        std::fs::write(
            &path,
            "database_path = \"/tmp/cards.db\"\nsession_size = 12\nlog_filter = \"study_scheduler=debug\"\nprogress_export_dir = \"/tmp/progress\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/cards.db"));
        assert_eq!(config.session_size, 12);
        assert_eq!(config.log_filter, "study_scheduler=debug");
        assert_eq!(config.progress_export_dir, Some(PathBuf::from("/tmp/progress")));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let result = Config::from_toml("session_size = \"many\"");
        assert!(matches!(result, Err(SchedulerError::Config(_))));
    }
}
