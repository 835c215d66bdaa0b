// Settings store
// Typed application settings persisted as a JSON file outside SQLite.
// The store is an explicit handle passed to whoever needs it; there is no
// process-global settings state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Rarity;

/// App identifier used for the data directory
pub const APP_IDENTIFIER: &str = "com.cardforge.CardForge";

/// Settings file name
pub const SETTINGS_FILE: &str = "settings.json";

/// Default settings format version
fn default_settings_version() -> u32 {
    1
}

/// Default UI theme
fn default_theme() -> String {
    String::from("dark")
}

/// Application settings persisted outside the card database
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Settings format version for migration
    #[serde(default = "default_settings_version")]
    pub version: u32,
    /// UI theme name
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Explicit database path override (None = default location)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    /// Per-rarity overlay template image paths, keyed by rarity name
    #[serde(default)]
    pub rarity_templates: HashMap<String, PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: default_settings_version(),
            theme: default_theme(),
            database_path: None,
            rarity_templates: HashMap::new(),
        }
    }
}

/// Handle to the settings file: owns the loaded values and knows where to
/// save them back.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: AppSettings,
}

impl SettingsStore {
    /// Load settings from the given path. A missing file yields defaults;
    /// an unreadable or unparsable file is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, String> {
        let path = path.into();
        let settings = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read settings file: {}", e))?;
            serde_json::from_str(&raw)
                .map_err(|e| format!("Failed to parse settings file: {}", e))?
        } else {
            AppSettings::default()
        };
        Ok(Self { path, settings })
    }

    /// Load settings from the default location
    pub fn open_default() -> Result<Self, String> {
        Self::load(default_settings_path()?)
    }

    /// Write the current settings back to disk
    pub fn save(&self) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create settings directory: {}", e))?;
        }
        let raw = serde_json::to_string_pretty(&self.settings)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;
        fs::write(&self.path, raw).map_err(|e| format!("Failed to write settings file: {}", e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut AppSettings {
        &mut self.settings
    }

    /// Canonical managed directory for rarity template images, a sibling of
    /// the settings file.
    pub fn templates_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) => parent.join("templates"),
            None => PathBuf::from("templates"),
        }
    }

    /// Template image path configured for a rarity, if any
    pub fn template_for(&self, rarity: Rarity) -> Option<&Path> {
        self.settings
            .rarity_templates
            .get(rarity.as_str())
            .map(PathBuf::as_path)
    }

    pub fn set_template(&mut self, rarity: Rarity, path: PathBuf) {
        self.settings
            .rarity_templates
            .insert(rarity.as_str().to_string(), path);
    }
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf, String> {
    dirs::data_dir()
        .map(|p| p.join(APP_IDENTIFIER))
        .ok_or_else(|| "Could not determine application data directory".to_string())
}

/// Get the default settings file path
pub fn default_settings_path() -> Result<PathBuf, String> {
    get_app_data_dir().map(|p| p.join(SETTINGS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::load(dir.path().join("settings.json")).unwrap();

        assert_eq!(store.settings().theme, "dark");
        assert!(store.settings().rarity_templates.is_empty());
        assert!(store.template_for(Rarity::Common).is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = SettingsStore::load(&path).unwrap();
        store.settings_mut().theme = String::from("light");
        store.set_template(Rarity::Rare, PathBuf::from("/tmp/rare.png"));
        store.save().unwrap();

        let reloaded = SettingsStore::load(&path).unwrap();
        assert_eq!(reloaded.settings().theme, "light");
        assert_eq!(
            reloaded.template_for(Rarity::Rare),
            Some(Path::new("/tmp/rare.png"))
        );
    }

    #[test]
    fn test_templates_dir_is_sibling_of_settings_file() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::load(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.templates_dir(), dir.path().join("templates"));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let result = SettingsStore::load(&path);
        assert!(result.is_err());
    }
}
