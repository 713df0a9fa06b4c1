//! Settings for the Atlas CLI.
//!
//! A small JSON file holds the optional photo-search credential and cache
//! lifetime overrides. The file lives in the standard configuration directory
//! (`~/.config/atlas/settings.json` on most platforms) unless
//! `ATLAS_SETTINGS_PATH` points elsewhere. Environment variables win over the
//! file for the credential.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::{config_dir, home_dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable allowing callers to override the settings file path.
pub const SETTINGS_PATH_ENV: &str = "ATLAS_SETTINGS_PATH";

/// Environment variable carrying the photo search credential.
pub const PHOTO_ACCESS_KEY_ENV: &str = "ATLAS_UNSPLASH_KEY";

/// Default filename for the JSON payload.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Error surfaced when reading settings fails.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// I/O failure other than a missing file (for example, permissions).
    #[error("settings I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per data kind cache lifetime overrides, in seconds.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtlOverrides {
    #[serde(default)]
    pub countries_secs: Option<u64>,
    #[serde(default)]
    pub weather_secs: Option<u64>,
    #[serde(default)]
    pub summary_secs: Option<u64>,
    #[serde(default)]
    pub photos_secs: Option<u64>,
}

impl TtlOverrides {
    pub fn countries(&self) -> Option<Duration> {
        self.countries_secs.map(Duration::from_secs)
    }

    pub fn weather(&self) -> Option<Duration> {
        self.weather_secs.map(Duration::from_secs)
    }

    pub fn summary(&self) -> Option<Duration> {
        self.summary_secs.map(Duration::from_secs)
    }

    pub fn photos(&self) -> Option<Duration> {
        self.photos_secs.map(Duration::from_secs)
    }
}

/// Persisted settings values.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasSettings {
    /// Credential for the photo search provider. Without one the photos
    /// query stays inactive.
    #[serde(default)]
    pub photo_access_key: Option<String>,
    #[serde(default)]
    pub ttl_overrides: TtlOverrides,
}

impl AtlasSettings {
    /// Load settings from the resolved path, then apply environment overrides.
    pub fn load() -> Result<Self, SettingsError> {
        let path = default_settings_path();
        let mut settings = load_from_path(&path)?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// The photo credential, with blank values treated as absent.
    pub fn photo_credential(&self) -> Option<&str> {
        self.photo_access_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = env::var(PHOTO_ACCESS_KEY_ENV)
            && !key.trim().is_empty()
        {
            debug!(variable = PHOTO_ACCESS_KEY_ENV, "photo credential taken from environment");
            self.photo_access_key = Some(key.trim().to_string());
        }
    }
}

/// Path of the settings file: `ATLAS_SETTINGS_PATH` when set, otherwise the
/// platform configuration directory.
pub fn default_settings_path() -> PathBuf {
    if let Ok(path) = env::var(SETTINGS_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("atlas")
        .join(SETTINGS_FILE_NAME)
}

/// Read settings from `path`. A missing file yields defaults; a malformed
/// file is logged and also yields defaults.
pub fn load_from_path(path: &Path) -> Result<AtlasSettings, SettingsError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(settings) => Ok(settings),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse settings file; using defaults"
                );
                Ok(AtlasSettings::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(AtlasSettings::default()),
        Err(error) => Err(SettingsError::Io {
            path: path.to_path_buf(),
            source: error,
        }),
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if path == "~" {
        return home();
    }
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = load_from_path(&dir.path().join("absent.json")).expect("load");
        assert_eq!(settings, AtlasSettings::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "{ not json").expect("write");
        assert_eq!(load_from_path(&path).expect("load"), AtlasSettings::default());
    }

    #[test]
    fn reads_credential_and_ttl_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, r#"{"photo_access_key": "abc", "ttl_overrides": {"weather_secs": 60}}"#).expect("write");

        let settings = load_from_path(&path).expect("load");
        assert_eq!(settings.photo_credential(), Some("abc"));
        assert_eq!(settings.ttl_overrides.weather(), Some(Duration::from_secs(60)));
        assert_eq!(settings.ttl_overrides.summary(), None);
    }

    #[test]
    fn blank_credential_counts_as_absent() {
        let settings = AtlasSettings {
            photo_access_key: Some("   ".into()),
            ..AtlasSettings::default()
        };
        assert_eq!(settings.photo_credential(), None);
    }

    #[test]
    fn environment_overrides_file_credential() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, r#"{"photo_access_key": "from-file"}"#).expect("write");
        let path_value = path.to_string_lossy().to_string();

        temp_env::with_vars(
            [(SETTINGS_PATH_ENV, Some(path_value.as_str())), (PHOTO_ACCESS_KEY_ENV, Some("from-env"))],
            || {
                let settings = AtlasSettings::load().expect("load");
                assert_eq!(settings.photo_credential(), Some("from-env"));
            },
        );

        temp_env::with_vars(
            [(SETTINGS_PATH_ENV, Some(path_value.as_str())), (PHOTO_ACCESS_KEY_ENV, None)],
            || {
                let settings = AtlasSettings::load().expect("load");
                assert_eq!(settings.photo_credential(), Some("from-file"));
            },
        );
    }
}
