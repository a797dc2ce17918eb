//! Persisted user settings (lives in the OS config directory).

use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::ViewMode;

const QUALIFIER: &str = "";
const ORGANIZATION: &str = "";
const APPLICATION: &str = "GanttEditor";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Timeline granularity restored at startup.
    pub view_mode: ViewMode,
    /// Default log filter; `RUST_LOG` takes precedence.
    pub log_level: String,
    /// Folder the file dialogs open in.
    pub last_directory: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Day,
            log_level: "info".into(),
            last_directory: None,
        }
    }
}

impl Settings {
    /// Where the settings file lives, falling back to the working directory.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
            .unwrap_or_else(|| PathBuf::from(".").join(SETTINGS_FILE))
    }

    /// Load settings from `path`. A missing or unreadable file yields the
    /// defaults.
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return Self::default(),
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!("ignoring unreadable settings {}: {e}", path.display());
            Self::default()
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Remember the folder of a file the user just picked.
    pub fn remember_directory(&mut self, file: &Path) {
        if let Some(dir) = file.parent() {
            self.last_directory = Some(dir.to_path_buf());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let mut settings = Settings {
            view_mode: ViewMode::Week,
            ..Default::default()
        };
        settings.remember_directory(&dir.path().join("plan.json"));
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{"view_mode": "Month"}"#).unwrap();
        let settings = Settings::load_from(&path);
        assert_eq!(settings.view_mode, ViewMode::Month);
        assert_eq!(settings.log_level, "info");
    }
}
