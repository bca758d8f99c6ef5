use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Source site constants
// =============================================================================

/// Landing page that lists the current app versions
pub const SOURCE_URL: &str = "https://vanced.to/";

/// Default interval between check cycles in seconds (1 hour)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60 * 60;

/// Timeout for a single page fetch in seconds
pub const FETCH_TIMEOUT_SECS: u64 = 30;

/// File name of the persisted version state inside the data directory
pub const STATE_FILE_NAME: &str = "app_state.json";

/// File name of the log file inside the data directory
pub const LOG_FILE_NAME: &str = "vanced-watch.log";

/// Environment variable holding the Discord webhook URL
pub const WEBHOOK_URL_ENV: &str = "DISCORD_WEBHOOK_URL";

/// Runtime configuration resolved from defaults, environment and CLI flags
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
    pub source_url: String,
    pub poll_interval: Duration,
    pub state_path: PathBuf,
    pub webhook_url: Option<String>,
}

impl WatchConfig {
    /// Build a configuration from defaults plus the process environment
    pub fn from_env() -> Self {
        Self {
            source_url: SOURCE_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            state_path: state_path(),
            webhook_url: std::env::var(WEBHOOK_URL_ENV).ok().filter(|v| !v.is_empty()),
        }
    }
}

/// Returns the path to the data directory for vanced-watch.
/// Uses $XDG_DATA_HOME/vanced-watch if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/vanced-watch,
/// or ./vanced-watch if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the state file.
pub fn state_path() -> PathBuf {
    data_dir().join(STATE_FILE_NAME)
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join(LOG_FILE_NAME)
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("vanced-watch")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/vanced-watch"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.local/share/vanced-watch"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./vanced-watch"));
    }
}
