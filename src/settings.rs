//! Engine settings persisted as TOML
//!
//! Stored in ~/.config/blockfall/settings.toml (or platform equivalent).
//! Every table is optional; missing keys take their defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::board::{DEFAULT_COLUMNS, DEFAULT_GARBAGE_PERIOD, DEFAULT_ROWS};
use crate::input::KeyRepeat;
use crate::score::{DEFAULT_CLEAR_POINTS, DEFAULT_ROWS_PER_LEVEL, ScoreRules};

const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid setting: {0}")]
    Invalid(&'static str),
}

/// Engine settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub board: BoardSettings,
    pub timing: TimingSettings,
    pub scoring: ScoringSettings,
}

/// Grid dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub rows: usize,
    pub columns: usize,
}

/// Tick counts and key repeat thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Gravity period at level 1
    pub drop_interval_ticks: u32,
    /// Gravity period floor reached at high levels
    pub min_drop_interval_ticks: u32,
    /// Ticks between garbage injection opportunities
    pub garbage_period_ticks: u32,
    /// Hold time before a held key first repeats
    pub key_initial_delay_ms: u64,
    /// Hold time between later repeats
    pub key_repeat_delay_ms: u64,
}

/// Point table and level pacing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub rows_per_level: u32,
    /// Points for 1, 2, 3 and 4 rows cleared in one lock
    pub points: Vec<u64>,
    pub soft_drop_points_per_tick: u64,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            drop_interval_ticks: 10,
            min_drop_interval_ticks: 1,
            garbage_period_ticks: DEFAULT_GARBAGE_PERIOD,
            key_initial_delay_ms: 450,
            key_repeat_delay_ms: 400,
        }
    }
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            rows_per_level: DEFAULT_ROWS_PER_LEVEL,
            points: DEFAULT_CLEAR_POINTS.to_vec(),
            soft_drop_points_per_tick: 1,
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockfall", "blockfall").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(SETTINGS_FILE))
    }

    /// Load settings from the config directory, or fall back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load and validate settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = toml::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save settings to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.board.rows == 0 || self.board.columns == 0 {
            return Err(SettingsError::Invalid("board must have at least one row and column"));
        }
        if self.board.columns < 4 {
            return Err(SettingsError::Invalid("board must fit the four-wide piece"));
        }
        if self.timing.drop_interval_ticks == 0 || self.timing.min_drop_interval_ticks == 0 {
            return Err(SettingsError::Invalid("drop interval must be at least one tick"));
        }
        if self.timing.garbage_period_ticks == 0 {
            return Err(SettingsError::Invalid("garbage period must be at least one tick"));
        }
        if self.scoring.points.is_empty() {
            return Err(SettingsError::Invalid("point table must not be empty"));
        }
        if self.scoring.rows_per_level == 0 {
            return Err(SettingsError::Invalid("rows per level must be positive"));
        }
        Ok(())
    }

    pub fn score_rules(&self) -> ScoreRules {
        ScoreRules {
            clear_points: self.scoring.points.clone(),
            rows_per_level: self.scoring.rows_per_level,
            soft_drop_points: self.scoring.soft_drop_points_per_tick,
            min_drop_interval: self.timing.min_drop_interval_ticks,
        }
    }

    pub fn key_repeat(&self) -> KeyRepeat {
        KeyRepeat::new(
            Duration::from_millis(self.timing.key_initial_delay_ms),
            Duration::from_millis(self.timing.key_repeat_delay_ms),
        )
    }
}
