//! Runtime configuration.
//!
//! Resolves where local storage, logs and exports live. The data directory
//! defaults to `~/.tasklog` and can be overridden with `--data-dir`.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::export::DEFAULT_EXPORT_FILE;

pub const DATA_DIR_NAME: &str = ".tasklog";
pub const STORAGE_FILE: &str = "storage.json";
pub const LOG_FILE: &str = "tasklog.log";
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub storage_path: PathBuf,
    pub export_path: PathBuf,
    pub log_path: PathBuf,
    pub clock_interval: Duration,
}

impl Config {
    /// Build a configuration rooted at `data_dir`, without touching the filesystem.
    pub fn with_data_dir(data_dir: &Path) -> Self {
        Config {
            data_dir: data_dir.to_path_buf(),
            storage_path: data_dir.join(STORAGE_FILE),
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE),
            log_path: data_dir.join(LOG_FILE),
            clock_interval: CLOCK_INTERVAL,
        }
    }

    /// Resolve the data directory (explicit override or `$HOME/.tasklog`) and create it.
    pub fn resolve(data_dir: Option<&Path>) -> io::Result<Self> {
        let dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_data_dir(),
        };
        std::fs::create_dir_all(&dir)?;
        Ok(Self::with_data_dir(&dir))
    }
}

fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(DATA_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_creates_override_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("log");
        let config = Config::resolve(Some(&data_dir)).unwrap();
        assert!(data_dir.is_dir());
        assert_eq!(config.storage_path, data_dir.join(STORAGE_FILE));
        assert_eq!(config.log_path, data_dir.join(LOG_FILE));
        assert_eq!(config.export_path, PathBuf::from("output.txt"));
        assert_eq!(config.clock_interval, Duration::from_secs(1));
    }
}
