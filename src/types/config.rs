//! Configuration for Iberia Chronos.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{ChronosError, ChronosResult};

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "chronos.toml";

/// Zoom range accepted for `map.zoom`.
pub const MIN_MAP_ZOOM: u8 = 3;
pub const MAX_MAP_ZOOM: u8 = 10;

/// Main configuration for Iberia Chronos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Gemini generation settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Map view settings.
    #[serde(default)]
    pub map: MapConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Settings for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL of the REST API (without the `/models/...` suffix).
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl GeminiConfig {
    /// Reads the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    // Flash model for the lowest latency
    "gemini-3-flash-preview".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

/// Map view settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Slippy-map tile URL template (`{s}`, `{z}`, `{x}`, `{y}`, `{r}`).
    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    /// Attribution text required by the tile provider.
    #[serde(default = "default_attribution")]
    pub attribution: String,

    /// Initial map center as `[latitude, longitude]`.
    #[serde(default = "default_center")]
    pub center: [f64; 2],

    /// Initial zoom level.
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_url: default_tile_url(),
            attribution: default_attribution(),
            center: default_center(),
            zoom: default_zoom(),
        }
    }
}

fn default_tile_url() -> String {
    "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png".to_string()
}

fn default_attribution() -> String {
    "© OpenStreetMap contributors".to_string()
}

fn default_center() -> [f64; 2] {
    [40.0, -3.7]
}

fn default_zoom() -> u8 {
    6
}

impl Config {
    /// Loads configuration from a TOML file and validates it.
    pub fn load<P: AsRef<Path>>(path: P) -> ChronosResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the map and the generator cannot work with.
    pub fn validate(&self) -> ChronosResult<()> {
        if !matches!(self.general.log_format.as_str(), "text" | "json") {
            return Err(ChronosError::config(format!(
                "log_format must be \"text\" or \"json\", got \"{}\"",
                self.general.log_format
            )));
        }
        if self.gemini.model.trim().is_empty() {
            return Err(ChronosError::config("gemini.model is empty"));
        }
        if self.gemini.api_key_env.trim().is_empty() {
            return Err(ChronosError::config("gemini.api_key_env is empty"));
        }
        if let Some(missing) = ["{z}", "{x}", "{y}"]
            .into_iter()
            .find(|placeholder| !self.map.tile_url.contains(placeholder))
        {
            return Err(ChronosError::config(format!(
                "map.tile_url is missing {}",
                missing
            )));
        }
        let [lat, lng] = self.map.center;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(ChronosError::config(format!(
                "map.center [{}, {}] is not a valid coordinate",
                lat, lng
            )));
        }
        if !(MIN_MAP_ZOOM..=MAX_MAP_ZOOM).contains(&self.map.zoom) {
            return Err(ChronosError::config(format!(
                "map.zoom must be between {} and {}, got {}",
                MIN_MAP_ZOOM, MAX_MAP_ZOOM, self.map.zoom
            )));
        }
        Ok(())
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ChronosResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            gemini: GeminiConfig::default(),
            map: MapConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
