//! TOML-based application configuration.
//!
//! Stores user preferences for the three apps:
//! - `[breath]`: profile name, daily breathing reminder, appearance
//! - `[news]`: feed categories, reader appearance, notification toggles
//! - `[vocab]`: card display options, word-of-the-day reminder
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::news::Category;

/// Breath Snack preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreathConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub notifications_enabled: bool,
    #[serde(default = "default_reminder_hour")]
    pub reminder_hour: u32,
    #[serde(default)]
    pub reminder_minute: u32,
    #[serde(default)]
    pub dark_mode: bool,
}

/// TechFizz preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub notify_breaking_news: bool,
    #[serde(default)]
    pub notify_bookmarks: bool,
    /// Categories chosen on the categories screen.
    #[serde(default)]
    pub selected_categories: Vec<Category>,
    /// The saved category selection is ignored until the first apply.
    #[serde(default)]
    pub has_launched_before: bool,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

/// Card text size preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontSize {
    Small,
    #[default]
    Normal,
    Large,
}

impl FontSize {
    /// Point size used for the headline word on a card.
    pub fn word_points(self) -> u32 {
        match self {
            FontSize::Small => 28,
            FontSize::Normal => 32,
            FontSize::Large => 38,
        }
    }

    /// Point size used for phrase and usage text.
    pub fn body_points(self) -> u32 {
        match self {
            FontSize::Small => 14,
            FontSize::Normal => 16,
            FontSize::Large => 18,
        }
    }
}

/// WordSubs preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabConfig {
    #[serde(default = "default_true")]
    pub show_usage_examples: bool,
    #[serde(default = "default_true")]
    pub show_word_of_the_day: bool,
    #[serde(default)]
    pub daily_reminder_enabled: bool,
    /// Seconds after midnight; 32400 is 09:00.
    #[serde(default = "default_reminder_time_seconds")]
    pub reminder_time_seconds: u32,
    #[serde(default)]
    pub font_size: FontSize,
    /// Optional phrase list replacing the bundled one.
    #[serde(default)]
    pub phrases_path: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub breath: BreathConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub vocab: VocabConfig,
}

// Default functions
fn default_reminder_hour() -> u32 {
    9
}
fn default_font_size() -> f64 {
    16.0
}
fn default_region() -> String {
    "US".into()
}
fn default_api_base_url() -> String {
    crate::news::DEFAULT_BASE_URL.into()
}
fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_true() -> bool {
    true
}
fn default_reminder_time_seconds() -> u32 {
    32_400
}

impl Default for BreathConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            notifications_enabled: false,
            reminder_hour: default_reminder_hour(),
            reminder_minute: 0,
            dark_mode: false,
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            dark_mode: false,
            font_size: default_font_size(),
            region: default_region(),
            notify_breaking_news: false,
            notify_bookmarks: false,
            selected_categories: Vec::new(),
            has_launched_before: false,
            api_base_url: default_api_base_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Default for VocabConfig {
    fn default() -> Self {
        Self {
            show_usage_examples: true,
            show_word_of_the_day: true,
            daily_reminder_enabled: false,
            reminder_time_seconds: default_reminder_time_seconds(),
            font_size: FontSize::Normal,
            phrases_path: None,
        }
    }
}

impl VocabConfig {
    /// Restore the preferences screen defaults. The phrase source and the
    /// word of the day toggle are kept.
    pub fn reset_preferences(&mut self) {
        let phrases_path = self.phrases_path.take();
        *self = Self {
            phrases_path,
            show_word_of_the_day: self.show_word_of_the_day,
            ..Self::default()
        };
    }

    /// Reminder time as (hour, minute).
    pub fn reminder_hour_minute(&self) -> (u32, u32) {
        let secs = self.reminder_time_seconds;
        (secs / 3600, (secs % 3600) / 60)
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    // Strings and unset optionals take the raw text.
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value in memory by dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.check_ranges(key)?;
        *self = updated;
        Ok(())
    }

    /// Reminder times must name a real time of day.
    fn check_ranges(&self, key: &str) -> Result<(), ConfigError> {
        let out_of_range = |message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        if self.breath.reminder_hour > 23 {
            return Err(out_of_range("hour must be between 0 and 23"));
        }
        if self.breath.reminder_minute > 59 {
            return Err(out_of_range("minute must be between 0 and 59"));
        }
        if self.vocab.reminder_time_seconds >= 24 * 3600 {
            return Err(out_of_range("seconds must be less than 86400"));
        }
        Ok(())
    }

    /// Set a config value by key and save to the default location.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.breath.reminder_hour, 9);
        assert_eq!(parsed.vocab.reminder_time_seconds, 32_400);
        assert_eq!(parsed.news.region, "US");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("[news]\nnotify_bookmarks = true\n").unwrap();
        assert!(parsed.news.notify_bookmarks);
        assert_eq!(parsed.news.cache_ttl_secs, 300);
        assert!(parsed.vocab.show_usage_examples);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("breath.reminder_hour").as_deref(), Some("9"));
        assert_eq!(cfg.get("vocab.font_size").as_deref(), Some("Normal"));
        assert!(cfg.get("news.missing_key").is_none());
    }

    #[test]
    fn set_value_updates_typed_fields() {
        let mut cfg = Config::default();
        cfg.set_value("news.notify_breaking_news", "true").unwrap();
        cfg.set_value("breath.reminder_minute", "30").unwrap();
        cfg.set_value("news.font_size", "18.5").unwrap();
        cfg.set_value("vocab.font_size", "Large").unwrap();
        assert!(cfg.news.notify_breaking_news);
        assert_eq!(cfg.breath.reminder_minute, 30);
        assert_eq!(cfg.news.font_size, 18.5);
        assert_eq!(cfg.vocab.font_size, FontSize::Large);
    }

    #[test]
    fn set_value_parses_category_lists() {
        let mut cfg = Config::default();
        cfg.set_value("news.selected_categories", r#"["ai", "gaming"]"#)
            .unwrap();
        assert_eq!(
            cfg.news.selected_categories,
            vec![Category::Ai, Category::Gaming]
        );
    }

    #[test]
    fn set_value_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set_value("news.nonexistent", "value").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn set_value_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set_value("breath.dark_mode", "not_a_bool").is_err());
        assert!(cfg.set_value("vocab.font_size", "Huge").is_err());
    }

    #[test]
    fn set_value_rejects_impossible_reminder_times() {
        let mut cfg = Config::default();
        for (key, value) in [
            ("breath.reminder_hour", "24"),
            ("breath.reminder_minute", "60"),
            ("vocab.reminder_time_seconds", "86400"),
        ] {
            let err = cfg.set_value(key, value).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }), "{key}={value}");
        }
        assert_eq!(cfg.breath.reminder_hour, 9);
        assert_eq!(cfg.breath.reminder_minute, 0);

        cfg.set_value("breath.reminder_hour", "23").unwrap();
        cfg.set_value("breath.reminder_minute", "59").unwrap();
        assert_eq!((cfg.breath.reminder_hour, cfg.breath.reminder_minute), (23, 59));
    }

    #[test]
    fn reset_preferences_keeps_phrase_source() {
        let mut vocab = VocabConfig {
            show_usage_examples: false,
            show_word_of_the_day: false,
            daily_reminder_enabled: true,
            reminder_time_seconds: 3600,
            font_size: FontSize::Small,
            phrases_path: Some("/tmp/phrases.json".into()),
            ..VocabConfig::default()
        };
        vocab.reset_preferences();
        assert!(vocab.show_usage_examples);
        assert!(!vocab.daily_reminder_enabled);
        assert_eq!(vocab.reminder_time_seconds, 32_400);
        assert_eq!(vocab.font_size, FontSize::Normal);
        assert_eq!(vocab.phrases_path.as_deref(), Some("/tmp/phrases.json"));
        assert!(!vocab.show_word_of_the_day);
    }

    #[test]
    fn reminder_time_splits_into_hour_and_minute() {
        let vocab = VocabConfig {
            reminder_time_seconds: 8 * 3600 + 45 * 60,
            ..VocabConfig::default()
        };
        assert_eq!(vocab.reminder_hour_minute(), (8, 45));
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.breath.reminder_hour, 9);

        let mut cfg = cfg;
        cfg.set_value("breath.username", "sam").unwrap();
        cfg.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.breath.username, "sam");
    }

    #[test]
    fn font_size_points() {
        assert_eq!(FontSize::Small.word_points(), 28);
        assert_eq!(FontSize::Normal.body_points(), 16);
        assert_eq!(FontSize::Large.word_points(), 38);
    }
}
