//! Durable name/version records for the tracked applications
//!
//! The store keeps one record per tracked app in memory and mirrors them to a
//! flat JSON file. Persistence is best-effort: read or write failures are
//! logged and the in-memory state stays authoritative for the process
//! lifetime.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// The closed set of applications whose versions are tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppId {
    YoutubeRevanced,
    Microg,
}

impl AppId {
    /// All tracked apps, in the fixed order cycles process them
    pub const ALL: [AppId; 2] = [AppId::YoutubeRevanced, AppId::Microg];

    /// Human-readable name, as shown on the source page and in notifications
    pub fn display_name(self) -> &'static str {
        match self {
            AppId::YoutubeRevanced => "YouTube ReVanced",
            AppId::Microg => "MicroG",
        }
    }

    /// Key used for this app in the persisted state file
    pub fn state_key(self) -> &'static str {
        match self {
            AppId::YoutubeRevanced => "youtube_revanced",
            AppId::Microg => "microg",
        }
    }
}

/// A tracked application and its last known version.
/// An empty version means the app has never been observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

impl AppInfo {
    pub fn new(app: AppId, version: impl Into<String>) -> Self {
        Self {
            name: app.display_name().to_string(),
            version: version.into(),
        }
    }
}

impl fmt::Display for AppInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Result of a single version update attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionUpdate {
    pub old: AppInfo,
    pub new: AppInfo,
    /// True iff the prior version was non-empty and differs from the new one.
    /// The first-ever observation seeds the store without counting as a change.
    pub changed: bool,
}

/// On-disk layout of the state file. Absent keys default to the empty string.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct PersistedState {
    youtube_revanced: String,
    microg: String,
}

#[derive(Debug, thiserror::Error)]
enum StateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed state file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Store of the current known versions, persisted to a flat JSON file
pub struct AppStore {
    path: PathBuf,
    versions: HashMap<AppId, String>,
}

impl AppStore {
    /// Load the store from `path`. A missing or malformed file is not an
    /// error: all versions start empty and the condition is logged.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let persisted = match Self::read_state(&path) {
            Ok(Some(state)) => {
                info!(
                    "Loaded state from {}: YouTube ReVanced={:?}, MicroG={:?}",
                    path.display(),
                    state.youtube_revanced,
                    state.microg
                );
                state
            }
            Ok(None) => {
                info!(
                    "No state file at {}, starting with empty versions",
                    path.display()
                );
                PersistedState::default()
            }
            Err(e) => {
                warn!(
                    "Failed to read state from {}: {}. Starting with empty versions",
                    path.display(),
                    e
                );
                PersistedState::default()
            }
        };

        let versions = HashMap::from([
            (AppId::YoutubeRevanced, persisted.youtube_revanced),
            (AppId::Microg, persisted.microg),
        ]);

        Self { path, versions }
    }

    /// The last known version for `app`; empty if never observed
    pub fn current_version(&self, app: AppId) -> &str {
        self.versions.get(&app).map(String::as_str).unwrap_or("")
    }

    /// Record a newly observed version for `app`.
    ///
    /// The in-memory record is overwritten unconditionally and the full state
    /// is saved, even when the version is unchanged. `changed` is only true
    /// when a non-empty prior version differs from `new_version`.
    pub fn update_version(&mut self, app: AppId, new_version: &str) -> VersionUpdate {
        let old_version = self.current_version(app).to_string();
        let changed = !old_version.is_empty() && old_version != new_version;

        self.versions.insert(app, new_version.to_string());
        self.save();

        VersionUpdate {
            old: AppInfo::new(app, old_version),
            new: AppInfo::new(app, new_version),
            changed,
        }
    }

    /// Clear all versions and delete the state file (used by the simulator)
    pub fn reset(&mut self) {
        for version in self.versions.values_mut() {
            version.clear();
        }

        if self.path.exists() {
            match fs::remove_file(&self.path) {
                Ok(()) => info!("Removed state file {}", self.path.display()),
                Err(e) => warn!("Failed to remove state file {}: {}", self.path.display(), e),
            }
        }
    }

    fn read_state(path: &Path) -> Result<Option<PersistedState>, StateError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Persist the full current state, logging and swallowing any failure
    fn save(&self) {
        if let Err(e) = self.try_save() {
            warn!("Failed to persist state to {}: {}", self.path.display(), e);
        }
    }

    fn try_save(&self) -> Result<(), StateError> {
        let state = PersistedState {
            youtube_revanced: self.current_version(AppId::YoutubeRevanced).to_string(),
            microg: self.current_version(AppId::Microg).to_string(),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to a sibling temp file and rename so the state file is always
        // either the old or the new content, never a partial write.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_string_pretty(&state)?)?;
        fs::rename(&tmp_path, &self.path)?;

        info!(
            "Saved state to {}: YouTube ReVanced={:?}, MicroG={:?}",
            self.path.display(),
            state.youtube_revanced,
            state.microg
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> AppStore {
        AppStore::load(dir.path().join("app_state.json"))
    }

    #[test]
    fn load_missing_file_starts_with_empty_versions() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.current_version(AppId::YoutubeRevanced), "");
        assert_eq!(store.current_version(AppId::Microg), "");
    }

    #[test]
    fn load_malformed_file_starts_with_empty_versions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app_state.json");
        fs::write(&path, "{not json").unwrap();

        let store = AppStore::load(&path);

        assert_eq!(store.current_version(AppId::YoutubeRevanced), "");
        assert_eq!(store.current_version(AppId::Microg), "");
    }

    #[test]
    fn load_file_with_missing_keys_defaults_them_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app_state.json");
        fs::write(&path, r#"{"youtube_revanced": "19.16.39"}"#).unwrap();

        let store = AppStore::load(&path);

        assert_eq!(store.current_version(AppId::YoutubeRevanced), "19.16.39");
        assert_eq!(store.current_version(AppId::Microg), "");
    }

    #[test]
    fn first_update_seeds_version_without_reporting_change() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let update = store.update_version(AppId::YoutubeRevanced, "1.0.0");

        assert!(!update.changed);
        assert_eq!(update.old.version, "");
        assert_eq!(update.new.version, "1.0.0");
        assert_eq!(store.current_version(AppId::YoutubeRevanced), "1.0.0");
    }

    #[test]
    fn update_to_different_version_reports_change() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.update_version(AppId::YoutubeRevanced, "1.0.0");
        let update = store.update_version(AppId::YoutubeRevanced, "1.0.1");

        assert!(update.changed);
        assert_eq!(update.old, AppInfo::new(AppId::YoutubeRevanced, "1.0.0"));
        assert_eq!(update.new, AppInfo::new(AppId::YoutubeRevanced, "1.0.1"));
    }

    #[test]
    fn repeated_update_with_same_version_reports_no_change() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.update_version(AppId::Microg, "0.3.1.4");
        store.update_version(AppId::Microg, "0.3.1.4");
        let update = store.update_version(AppId::Microg, "0.3.1.4");

        assert!(!update.changed);
        assert_eq!(store.current_version(AppId::Microg), "0.3.1.4");
    }

    #[test]
    fn updated_versions_survive_a_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app_state.json");

        let mut store = AppStore::load(&path);
        store.update_version(AppId::YoutubeRevanced, "19.16.39");
        store.update_version(AppId::Microg, "0.3.1.4");
        store.update_version(AppId::YoutubeRevanced, "19.17.0");

        let reloaded = AppStore::load(&path);
        assert_eq!(reloaded.current_version(AppId::YoutubeRevanced), "19.17.0");
        assert_eq!(reloaded.current_version(AppId::Microg), "0.3.1.4");
    }

    #[test]
    fn state_file_uses_flat_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app_state.json");

        let mut store = AppStore::load(&path);
        store.update_version(AppId::YoutubeRevanced, "19.16.39");

        let content = fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["youtube_revanced"], "19.16.39");
        assert_eq!(json["microg"], "");
    }

    #[test]
    fn save_failure_keeps_in_memory_state() {
        // A directory at the state path makes the rename fail
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app_state.json");
        fs::create_dir(&path).unwrap();

        let mut store = AppStore::load(&path);
        let update = store.update_version(AppId::YoutubeRevanced, "1.0.0");

        assert!(!update.changed);
        assert_eq!(store.current_version(AppId::YoutubeRevanced), "1.0.0");
    }

    #[test]
    fn reset_clears_versions_and_removes_state_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app_state.json");

        let mut store = AppStore::load(&path);
        store.update_version(AppId::YoutubeRevanced, "1.0.0");
        assert!(path.exists());

        store.reset();

        assert_eq!(store.current_version(AppId::YoutubeRevanced), "");
        assert!(!path.exists());
    }
}
