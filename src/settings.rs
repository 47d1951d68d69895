// Import necessary libraries and modules for file I/O and serialization.
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use strum_macros::{Display, EnumString};

use crate::error::ConfigError;
use crate::session::TranscriptPolicy;

pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "OPENAI_API_KEY"];
pub const BASE_URL_VAR: &str = "BASE_URL";
pub const MODEL_VAR: &str = "QUEST_MODEL";
pub const API_SHAPE_VAR: &str = "QUEST_API_SHAPE";
pub const ROUTING_VAR: &str = "QUEST_ROUTING";
pub const HISTORY_WINDOW_VAR: &str = "QUEST_HISTORY_WINDOW";
pub const TIMEOUT_VAR: &str = "QUEST_TIMEOUT_SECS";
pub const DEBUG_VAR: &str = "QUEST_DEBUG";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Which request shape the provider is spoken to with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ApiShape {
    ChatCompletions,
    Responses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RoutingMode {
    /// Local keyword matching picks the persona.
    Keyword,
    /// The coordinator persona lets the model pick through handoff tools.
    Handoff,
}

// Define a structure to hold application settings with serialization and deserialization capabilities.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub api_key: Option<String>,  // Key for the OpenAI-compatible provider.
    pub base_url: Option<String>, // Provider endpoint, e.g. Gemini's OpenAI-compatible URL.
    pub model: String,
    pub api_shape: ApiShape,
    pub routing: RoutingMode,
    pub history_window: Option<usize>, // Turns sent to the model, all of them when unset.
    pub request_timeout_secs: u64,
    pub debug_mode: bool, // Flag to enable or disable debug logging.
}

// Implement the Default trait for Settings to provide a method to create default settings.
impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_key: None,
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            api_shape: ApiShape::ChatCompletions,
            routing: RoutingMode::Handoff,
            history_window: None,
            request_timeout_secs: 60,
            debug_mode: false,
        }
    }
}

impl Settings {
    /// Directory holding the settings file and the log.
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quest_master")
            .join("data")
    }

    pub fn default_path() -> PathBuf {
        Self::data_dir().join("settings.json")
    }

    // Load settings from a specified file path.
    pub fn load_settings_from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let data = fs::read_to_string(path)?; // Read settings from file.
        let settings = serde_json::from_str(&data)?; // Deserialize JSON data into settings.
        Ok(settings)
    }

    /// Loads `path`, writing the defaults there on first run.
    ///
    /// An existing file that cannot be read or parsed is left untouched; the
    /// defaults are used and the error is handed back for the caller to log.
    pub fn load_or_default(path: impl AsRef<Path>) -> io::Result<(Self, Option<io::Error>)> {
        let path = path.as_ref();
        if !path.exists() {
            let defaults = Self::default();
            defaults.save_to_file(path)?;
            return Ok((defaults, None));
        }
        match Self::load_settings_from_file(path) {
            Ok(settings) => Ok((settings, None)),
            Err(e) => Ok((Self::default(), Some(e))),
        }
    }

    // Save current settings to a specified file path.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?; // Create the directory if it doesn't exist.
        }
        let mut file = fs::File::create(path)?; // Create or overwrite the file.
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    /// Overrides fields from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overrides fields from `lookup`; empty values count as unset.
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(api_key) = API_KEY_VARS.into_iter().find_map(|key| var(key)) {
            self.api_key = Some(api_key);
        }
        if let Some(base_url) = var(BASE_URL_VAR) {
            self.base_url = Some(base_url);
        }
        if let Some(model) = var(MODEL_VAR) {
            self.model = model;
        }
        if let Some(shape) = var(API_SHAPE_VAR) {
            self.api_shape = parse(API_SHAPE_VAR, &shape)?;
        }
        if let Some(routing) = var(ROUTING_VAR) {
            self.routing = parse(ROUTING_VAR, &routing)?;
        }
        if let Some(window) = var(HISTORY_WINDOW_VAR) {
            self.history_window = Some(parse(HISTORY_WINDOW_VAR, &window)?);
            self.check_history_window()?;
        }
        if let Some(secs) = var(TIMEOUT_VAR) {
            self.request_timeout_secs = parse(TIMEOUT_VAR, &secs)?;
        }
        if let Some(debug) = var(DEBUG_VAR) {
            self.debug_mode = parse(DEBUG_VAR, &debug.to_lowercase())?;
        }
        Ok(())
    }

    /// Checks what the completion client needs before anything is started.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingApiKey);
        }
        if self.base_url.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingBaseUrl);
        }
        if self.api_shape != ApiShape::ChatCompletions {
            return Err(ConfigError::UnsupportedApiShape(self.api_shape.to_string()));
        }
        self.check_history_window()
    }

    // An empty window would send the model no player message at all.
    fn check_history_window(&self) -> Result<(), ConfigError> {
        match self.history_window {
            Some(0) => Err(ConfigError::InvalidValue {
                key: HISTORY_WINDOW_VAR.to_string(),
                value: "0".to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub fn transcript_policy(&self) -> TranscriptPolicy {
        self.history_window.into()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug_mode {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}
