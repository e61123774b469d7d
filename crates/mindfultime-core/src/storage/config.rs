//! TOML-based application settings.
//!
//! Stores user preferences including:
//! - Notification preferences
//! - Blocking behavior (strict mode, near-limit threshold, sweep cadence)
//! - Daily mindfulness goal
//! - Theme
//!
//! Settings are stored at `~/.config/mindfultime/config.toml`.

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;

/// Notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Blocking behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockingConfig {
    /// Block apps immediately when the limit is reached.
    #[serde(default)]
    pub strict_mode: bool,
    /// Fraction of the daily limit at which an app counts as near-limit.
    #[serde(default = "default_near_limit_threshold")]
    pub near_limit_threshold: f64,
    /// Seconds between limit-check sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// Goal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalsConfig {
    /// Minutes of mindful activities aimed for per day.
    #[serde(default = "default_daily_goal")]
    pub daily_goal_minutes: u32,
}

/// Application settings.
///
/// Serialized to/from TOML at `~/.config/mindfultime/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub blocking: BlockingConfig,
    #[serde(default)]
    pub goals: GoalsConfig,
    /// "light", "dark", or "auto".
    #[serde(default = "default_theme")]
    pub theme: String,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_near_limit_threshold() -> f64 {
    0.9
}
fn default_sweep_interval_secs() -> u64 {
    60
}
fn default_daily_goal() -> u32 {
    60
}
fn default_theme() -> String {
    "auto".to_string()
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            near_limit_threshold: default_near_limit_threshold(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            daily_goal_minutes: default_daily_goal(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications: NotificationsConfig::default(),
            blocking: BlockingConfig::default(),
            goals: GoalsConfig::default(),
            theme: default_theme(),
        }
    }
}

impl Settings {
    /// Load settings from `~/.config/mindfultime/config.toml`.
    ///
    /// Missing file yields defaults; a malformed file is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let path = data_dir()
            .map_err(|e| ConfigError::LoadFailed {
                path: "config.toml".into(),
                message: e.to_string(),
            })?
            .join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Save settings to `~/.config/mindfultime/config.toml`.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = data_dir()
            .map_err(|e| ConfigError::SaveFailed {
                path: "config.toml".into(),
                message: e.to_string(),
            })?
            .join("config.toml");
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Read a value by dotted key, e.g. `blocking.strict_mode`.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "notifications.enabled" => Some(self.notifications.enabled.to_string()),
            "blocking.strict_mode" => Some(self.blocking.strict_mode.to_string()),
            "blocking.near_limit_threshold" => {
                Some(self.blocking.near_limit_threshold.to_string())
            }
            "blocking.sweep_interval_secs" => Some(self.blocking.sweep_interval_secs.to_string()),
            "goals.daily_goal_minutes" => Some(self.goals.daily_goal_minutes.to_string()),
            "theme" => Some(self.theme.clone()),
            _ => None,
        }
    }

    /// Set a value by dotted key. Returns false for unknown keys or
    /// unparseable values.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        match key {
            "notifications.enabled" => match value.parse() {
                Ok(v) => {
                    self.notifications.enabled = v;
                    true
                }
                Err(_) => false,
            },
            "blocking.strict_mode" => match value.parse() {
                Ok(v) => {
                    self.blocking.strict_mode = v;
                    true
                }
                Err(_) => false,
            },
            "blocking.near_limit_threshold" => match value.parse() {
                Ok(v) => {
                    self.blocking.near_limit_threshold = v;
                    true
                }
                Err(_) => false,
            },
            "blocking.sweep_interval_secs" => match value.parse() {
                Ok(v) => {
                    self.blocking.sweep_interval_secs = v;
                    true
                }
                Err(_) => false,
            },
            "goals.daily_goal_minutes" => match value.parse() {
                Ok(v) => {
                    self.goals.daily_goal_minutes = v;
                    true
                }
                Err(_) => false,
            },
            "theme" => {
                if matches!(value, "light" | "dark" | "auto") {
                    self.theme = value.to_string();
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// All known dotted keys and their current values.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        const KEYS: [&str; 6] = [
            "notifications.enabled",
            "blocking.strict_mode",
            "blocking.near_limit_threshold",
            "blocking.sweep_interval_secs",
            "goals.daily_goal_minutes",
            "theme",
        ];
        KEYS.iter()
            .filter_map(|k| self.get(k).map(|v| (*k, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert!(settings.notifications.enabled);
        assert!(!settings.blocking.strict_mode);
        assert_eq!(settings.blocking.near_limit_threshold, 0.9);
        assert_eq!(settings.goals.daily_goal_minutes, 60);
        assert_eq!(settings.theme, "auto");
    }

    #[test]
    fn toml_roundtrip() {
        let mut settings = Settings::default();
        settings.blocking.strict_mode = true;
        settings.theme = "dark".to_string();

        let raw = toml::to_string_pretty(&settings).unwrap();
        let decoded: Settings = toml::from_str(&raw).unwrap();
        assert!(decoded.blocking.strict_mode);
        assert_eq!(decoded.theme, "dark");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let decoded: Settings = toml::from_str("theme = \"dark\"").unwrap();
        assert_eq!(decoded.theme, "dark");
        assert!(decoded.notifications.enabled);
        assert_eq!(decoded.blocking.sweep_interval_secs, 60);
    }

    #[test]
    fn dotted_get_set() {
        let mut settings = Settings::default();
        assert!(settings.set("blocking.strict_mode", "true"));
        assert_eq!(settings.get("blocking.strict_mode").unwrap(), "true");

        assert!(!settings.set("blocking.strict_mode", "not-a-bool"));
        assert!(!settings.set("no.such.key", "1"));
        assert!(settings.get("no.such.key").is_none());

        assert!(!settings.set("theme", "neon"));
        assert!(settings.set("theme", "light"));
    }

    #[test]
    fn entries_cover_all_keys() {
        let settings = Settings::default();
        assert_eq!(settings.entries().len(), 6);
    }
}
