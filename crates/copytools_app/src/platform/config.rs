use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use copytools_core::DEFAULT_DOUBLE_CLICK_WINDOW_MS;
use copytools_engine::FetchSettings;
use copytools_logging::{copy_info, copy_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub(crate) const CONFIG_FILENAME: &str = "copytools.ron";
const APP_DIR_NAME: &str = "copytools";
const FALLBACK_DIR: &str = ".copytools";

/// Contents of `copytools.ron`. Every field may be omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub log_level: String,
    pub log_destination: LogDestination,
    pub double_click_window_ms: i64,
    pub fetch: FetchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_destination: LogDestination::Terminal,
            double_click_window_ms: DEFAULT_DOUBLE_CLICK_WINDOW_MS,
            fetch: FetchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FetchConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let defaults = FetchSettings::default();
        Self {
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            request_timeout_secs: defaults.request_timeout.as_secs(),
            redirect_limit: defaults.redirect_limit,
            max_bytes: defaults.max_bytes,
        }
    }
}

impl FetchConfig {
    pub fn to_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
        }
    }
}

/// `--data-dir`, else the platform data directory, else `./.copytools`.
pub(crate) fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME)))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR))
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Reads `copytools.ron` from `data_dir`. `Ok(None)` when there is no file.
///
/// Runs before the logger exists, so problems are returned for the caller to
/// report once logging is up.
pub(crate) fn load_config(data_dir: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let path = data_dir.join(CONFIG_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    ron::from_str::<AppConfig>(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse { path, source })
}

/// Settles on the config to run with and logs how it was obtained.
pub(crate) fn report_config(
    loaded: Result<Option<AppConfig>, ConfigError>,
    data_dir: &Path,
) -> AppConfig {
    match loaded {
        Ok(Some(config)) => {
            copy_info!("Loaded config from {:?}", data_dir.join(CONFIG_FILENAME));
            config
        }
        Ok(None) => AppConfig::default(),
        Err(err) => {
            copy_warn!("{}; using defaults", err);
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(load_config(temp.path()), Ok(None)));
        assert_eq!(report_config(Ok(None), temp.path()), AppConfig::default());
    }

    #[test]
    fn partial_file_is_merged_over_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILENAME),
            "(log_level: \"debug\", double_click_window_ms: 350, fetch: (redirect_limit: 2))",
        )
        .unwrap();

        let config = load_config(temp.path()).unwrap().unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.double_click_window_ms, 350);
        assert_eq!(config.fetch.redirect_limit, 2);
        assert_eq!(config.fetch.max_bytes, FetchConfig::default().max_bytes);
        assert_eq!(config.log_destination, LogDestination::Terminal);
    }

    #[test]
    fn invalid_file_is_reported_and_falls_back_to_defaults() {
        copytools_logging::initialize_for_tests();
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), "not ron at all (").unwrap();

        let loaded = load_config(temp.path());
        let err = loaded.as_ref().unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILENAME));
        assert_eq!(report_config(loaded, temp.path()), AppConfig::default());
    }

    #[test]
    fn unreadable_file_is_reported() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(CONFIG_FILENAME)).unwrap();

        let err = load_config(temp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn destination_is_read_by_variant_name() {
        let config: AppConfig = ron::from_str("(log_destination: Both)").unwrap();
        assert_eq!(config.log_destination, LogDestination::Both);
    }

    #[test]
    fn explicit_data_dir_wins() {
        let dir = PathBuf::from("/tmp/copytools-test");
        assert_eq!(resolve_data_dir(Some(dir.clone())), dir);
    }

    #[test]
    fn fetch_config_maps_to_engine_settings() {
        let settings = FetchConfig {
            connect_timeout_secs: 1,
            request_timeout_secs: 2,
            redirect_limit: 3,
            max_bytes: 4,
        }
        .to_settings();
        assert_eq!(settings.connect_timeout, Duration::from_secs(1));
        assert_eq!(settings.request_timeout, Duration::from_secs(2));
        assert_eq!(settings.redirect_limit, 3);
        assert_eq!(settings.max_bytes, 4);
    }
}
