use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::state::{AppState, Settings};

const SETTINGS_DIR: &str = "VocalTales";
const SETTINGS_FILE: &str = "settings.json";

pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

pub fn load_settings() -> Settings {
    match settings_path() {
        Some(path) => load_settings_from(&path),
        None => {
            tracing::warn!("No config directory on this system. Using defaults.");
            Settings::default()
        }
    }
}

pub fn load_settings_from(path: &Path) -> Settings {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No stored settings found. Using defaults.");
            return Settings::default();
        }
        Err(e) => {
            tracing::warn!("Failed to read settings file {}: {}. Using defaults.", path.display(), e);
            return Settings::default();
        }
    };

    match serde_json::from_str::<Settings>(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to deserialize stored settings: {}. Using defaults.", e);
            Settings::default()
        }
    }
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Write the app's current settings back to the config directory. Failures are logged only.
pub fn save_settings(state: &AppState) {
    let settings = state.settings.lock().clone();
    let Some(path) = settings_path() else {
        tracing::error!("No config directory on this system; settings not saved");
        return;
    };
    match save_settings_to(&path, &settings) {
        Ok(()) => tracing::debug!("Settings saved to {}", path.display()),
        Err(e) => tracing::error!("Failed to save settings to disk: {}", e),
    }
}
