//! Configuration system for chatlens.
//!
//! Provides layered configuration from multiple sources:
//!
//! 1. **Compiled defaults** - Sensible defaults built into the binary
//! 2. **User config file** - `~/.config/chatlens/config.toml`
//! 3. **Environment variables** - `CHATLENS_*` prefix
//! 4. **CLI arguments** - Highest priority, always wins
//!
//! # Example Configuration File
//!
//! ```toml
//! [paths]
//! db = "~/.local/share/chatlens/chatlens.db"
//!
//! [analysis]
//! max_export_mb = 50
//! top_words = 10
//! top_emojis = 5
//!
//! [screenshot]
//! max_image_mb = 10
//! language = "eng"
//! ocr_command = "tesseract"
//!
//! [features]
//! premium = true
//!
//! [output]
//! format = "text"
//! colors = true
//! ```

use crate::error::{ChatlensError, Result, VALID_CONFIG_KEYS, find_closest_match};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const MB: u64 = 1024 * 1024;

/// Main configuration structure for chatlens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub analysis: AnalysisConfig,
    pub screenshot: ScreenshotConfig,
    pub features: FeaturesConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Path to the `SQLite` key-value store.
    /// Environment variable: `CHATLENS_DB`
    pub db: Option<PathBuf>,
}

/// Export analysis limits and display caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Largest export file accepted, in MB.
    pub max_export_mb: u64,

    /// Words shown in reports (the engine keeps at most 10).
    pub top_words: usize,

    /// Emojis shown in reports (the engine keeps at most 5).
    pub top_emojis: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    /// Largest image accepted, in MB.
    pub max_image_mb: u64,

    /// OCR language code.
    /// Environment variable: `CHATLENS_LANG`
    pub language: String,

    /// OCR executable, invoked as `<cmd> <image> stdout -l <lang>`.
    /// Environment variable: `CHATLENS_OCR`
    pub ocr_command: String,
}

/// Feature gating for report sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Show highlights, topics and tips.
    /// Environment variable: `CHATLENS_PREMIUM`
    pub premium: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format: text, json, json-pretty.
    /// Environment variable: `CHATLENS_FORMAT`
    pub format: String,

    pub colors: bool,

    /// Suppress progress bars and status lines.
    /// Environment variable: `CHATLENS_QUIET`
    pub quiet: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_export_mb: 50,
            top_words: 10,
            top_emojis: 5,
        }
    }
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            max_image_mb: 10,
            language: "eng".to_string(),
            ocr_command: "tesseract".to_string(),
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self { premium: true }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            colors: true,
            quiet: false,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. User config file (~/.config/chatlens/config.toml)
    /// 3. Compiled defaults
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(user_config) = Self::user_config_path().and_then(|p| Self::load_from_file(&p))
        {
            config.merge(user_config);
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());

        debug!("Configuration loaded: {:?}", config);
        config
    }

    /// Load configuration from a specific file.
    ///
    /// A missing or unparsable file yields `None` (with a warning for the
    /// latter) so a broken config never blocks analysis.
    #[must_use]
    pub fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            debug!("Config file not found: {}", path.display());
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    info!("Loaded config from: {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    warn!("Failed to parse config file {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read config file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Get the path to the user configuration file.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chatlens").join("config.toml"))
    }

    /// Apply environment overrides read through `lookup`.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup("CHATLENS_DB") {
            self.paths.db = Some(PathBuf::from(db));
        }
        if let Some(language) = lookup("CHATLENS_LANG") {
            self.screenshot.language = language;
        }
        if let Some(command) = lookup("CHATLENS_OCR") {
            self.screenshot.ocr_command = command;
        }
        if let Some(premium) = lookup("CHATLENS_PREMIUM").as_deref().and_then(parse_bool) {
            self.features.premium = premium;
        }
        if let Some(format) = lookup("CHATLENS_FORMAT") {
            self.output.format = format;
        }
        if lookup("CHATLENS_NO_COLOR").is_some() || lookup("NO_COLOR").is_some() {
            self.output.colors = false;
        }
        if lookup("CHATLENS_QUIET").is_some() {
            self.output.quiet = true;
        }
    }

    /// Merge another config into this one (other takes precedence).
    fn merge(&mut self, other: Self) {
        if other.paths.db.is_some() {
            self.paths.db = other.paths.db;
        }
        self.analysis = other.analysis;
        self.screenshot = other.screenshot;
        self.features = other.features;
        self.output = other.output;
    }

    /// Set one dotted key (e.g. `features.premium`) from its string form.
    ///
    /// # Errors
    ///
    /// [`ChatlensError::InvalidArgument`] for unknown keys (with a
    /// suggestion when one is close) or unparsable values.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        fn number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value.trim().parse().map_err(|_| {
                ChatlensError::invalid_argument(format!("'{value}' is not a number for {key}"))
            })
        }
        fn boolean(key: &str, value: &str) -> Result<bool> {
            parse_bool(value).ok_or_else(|| {
                ChatlensError::invalid_argument(format!("'{value}' is not true/false for {key}"))
            })
        }

        match key {
            "paths.db" => self.paths.db = Some(PathBuf::from(value)),
            "analysis.max_export_mb" => self.analysis.max_export_mb = number(key, value)?,
            "analysis.top_words" => self.analysis.top_words = number(key, value)?,
            "analysis.top_emojis" => self.analysis.top_emojis = number(key, value)?,
            "screenshot.max_image_mb" => self.screenshot.max_image_mb = number(key, value)?,
            "screenshot.language" => self.screenshot.language = value.to_string(),
            "screenshot.ocr_command" => self.screenshot.ocr_command = value.to_string(),
            "features.premium" => self.features.premium = boolean(key, value)?,
            "output.format" => self.output.format = value.to_string(),
            "output.colors" => self.output.colors = boolean(key, value)?,
            "output.quiet" => self.output.quiet = boolean(key, value)?,
            _ => {
                let hint = find_closest_match(key, VALID_CONFIG_KEYS, None)
                    .map(|m| format!(" Did you mean '{m}'?"))
                    .unwrap_or_default();
                return Err(ChatlensError::invalid_argument(format!(
                    "unknown config key '{key}'.{hint}"
                )));
            }
        }
        Ok(())
    }

    /// Get the database path, using defaults if not configured.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.paths.db.clone().unwrap_or_else(crate::default_db_path)
    }

    #[must_use]
    pub const fn max_export_bytes(&self) -> u64 {
        self.analysis.max_export_mb.saturating_mul(MB)
    }

    #[must_use]
    pub const fn max_image_bytes(&self) -> u64 {
        self.screenshot.max_image_mb.saturating_mul(MB)
    }

    /// Save the current configuration to the user config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or the
    /// file cannot be written.
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::user_config_path().ok_or_else(|| ChatlensError::ConfigError {
            path: PathBuf::from("config.toml"),
            reason: "could not determine config directory".to_string(),
        })?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save to an explicit path, creating parent directories.
    ///
    /// # Errors
    ///
    /// IO or serialization errors.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ChatlensError::path_error("create", parent, e))?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| ChatlensError::ConfigError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        std::fs::write(path, content).map_err(|e| ChatlensError::path_error("write", path, e))?;
        info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Generate a default configuration file content.
    #[must_use]
    pub fn default_config_content() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}
