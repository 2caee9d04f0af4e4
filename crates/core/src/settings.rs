use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Player-level settings that sit outside any one cue sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSettings {
    /// Grace period before narration (and therefore the cue clock) starts.
    pub vo_start_delay_ms: u64,
    /// Playback speeds the transport cycles through.
    pub playback_rates: Vec<f64>,
    /// Directory cue sheet candidates are fetched from.
    pub cue_sheet_dir: PathBuf,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            vo_start_delay_ms: 1000,
            playback_rates: vec![1.0, 1.25, 1.5, 2.0],
            cue_sheet_dir: PathBuf::from("assets/animation-cues"),
        }
    }
}

/// Persisted settings file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsFile {
    pub version: String,
    pub settings: PlayerSettings,
    pub created_at: String,
    pub modified_at: String,
}

/// Loads and persists [`PlayerSettings`] as JSON.
/// Falls back to defaults when the file doesn't exist yet.
pub struct SettingsManager {
    settings_path: PathBuf,
    settings: PlayerSettings,
}

impl SettingsManager {
    /// If no path is provided, defaults to 'settings.json' in the current
    /// working directory
    pub fn new(settings_path: Option<PathBuf>) -> Self {
        let settings_path = settings_path.unwrap_or_else(|| PathBuf::from("settings.json"));
        Self {
            settings_path,
            settings: PlayerSettings::default(),
        }
    }

    /// Load settings from the settings file, creating it with defaults when
    /// it doesn't exist yet.
    pub fn load(&mut self) -> Result<PlayerSettings, SettingsError> {
        if !self.settings_path.exists() {
            self.save()?;
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.settings_path)
            .map_err(|e| SettingsError::ReadError(e.to_string()))?;

        let file: SettingsFile = serde_json::from_str(&content)
            .map_err(|e| SettingsError::ParseError(e.to_string()))?;

        if file.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "settings file version {} doesn't match application version {}",
                file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        self.settings = file.settings;
        Ok(self.settings.clone())
    }

    /// Save current settings to the settings file
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.settings_path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent)
                    .map_err(|e| SettingsError::WriteError(e.to_string()))?;
            }
        }

        let file = SettingsFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            modified_at: chrono::Utc::now().to_rfc3339(),
        };

        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| SettingsError::SerializeError(e.to_string()))?;

        fs::write(&self.settings_path, content)
            .map_err(|e| SettingsError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Update settings and save to file
    pub fn update_settings(&mut self, settings: PlayerSettings) -> Result<(), SettingsError> {
        self.settings = settings;
        self.save()
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Validate settings before accepting them from an external editor.
    pub fn validate_settings(settings: &PlayerSettings) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if settings.playback_rates.is_empty() {
            errors.push("playback_rates must not be empty".to_string());
        }
        for rate in &settings.playback_rates {
            if !rate.is_finite() || *rate <= 0.0 {
                errors.push(format!("playback rate {} is not a positive number", rate));
            }
        }
        if settings.vo_start_delay_ms > 60_000 {
            errors.push("vo_start_delay_ms must be at most 60000".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn reset_to_defaults(&mut self) -> Result<(), SettingsError> {
        self.settings = PlayerSettings::default();
        self.save()
    }
}

/// Settings error types
#[derive(Debug)]
pub enum SettingsError {
    ReadError(String),
    WriteError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::ReadError(msg) => write!(f, "Failed to read settings file: {}", msg),
            SettingsError::WriteError(msg) => write!(f, "Failed to write settings file: {}", msg),
            SettingsError::ParseError(msg) => write!(f, "Failed to parse settings file: {}", msg),
            SettingsError::SerializeError(msg) => {
                write!(f, "Failed to serialize settings: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_settings_manager_new() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test_settings.json");

        let manager = SettingsManager::new(Some(path.clone()));
        assert_eq!(manager.settings_path(), path);
        assert_eq!(manager.settings(), &PlayerSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test_settings.json");

        let mut manager = SettingsManager::new(Some(path.clone()));

        let mut settings = PlayerSettings::default();
        settings.vo_start_delay_ms = 250;
        settings.playback_rates = vec![1.0, 2.0];
        manager.update_settings(settings).unwrap();

        let mut manager2 = SettingsManager::new(Some(path));
        let loaded = manager2.load().unwrap();

        assert_eq!(loaded.vo_start_delay_ms, 250);
        assert_eq!(loaded.playback_rates, vec![1.0, 2.0]);
    }

    #[test]
    fn test_load_creates_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fresh.json");

        let mut manager = SettingsManager::new(Some(path.clone()));
        let loaded = manager.load().unwrap();
        assert_eq!(loaded, PlayerSettings::default());
        assert!(path.exists());
    }

    #[test]
    fn test_validation() {
        let mut settings = PlayerSettings::default();
        assert!(SettingsManager::validate_settings(&settings).is_ok());

        settings.playback_rates = vec![0.0];
        assert!(SettingsManager::validate_settings(&settings).is_err());

        settings.playback_rates = vec![1.0];
        settings.vo_start_delay_ms = 120_000;
        assert!(SettingsManager::validate_settings(&settings).is_err());
    }
}
