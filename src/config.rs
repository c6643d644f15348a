//! Effect profiles loaded from effects.toml

use std::collections::HashMap;
use std::path::Path;

use acrylic_engine::RawEffectOptions;
use serde::Deserialize;

/// Default profile file, looked up in the current directory.
pub const DEFAULT_PATH: &str = "effects.toml";

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Profile used when none is named on the command line
    #[serde(default)]
    pub default: Option<String>,
    /// Named effect presets. Keys are the engine option names.
    #[serde(default)]
    pub profiles: HashMap<String, RawEffectOptions>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.as_ref().display(), e)))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load an explicit path, or effects.toml if it exists. A missing
    /// default file yields an empty configuration.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_PATH).exists() => Self::load(DEFAULT_PATH),
            None => {
                log::debug!("No {} found, using built-in defaults", DEFAULT_PATH);
                Ok(Self::default())
            }
        }
    }

    /// Resolve a profile by name, falling back to the configured default.
    /// Returns empty options when neither is set.
    pub fn profile(&self, name: Option<&str>) -> Result<RawEffectOptions, ConfigError> {
        let Some(name) = name.or(self.default.as_deref()) else {
            return Ok(RawEffectOptions::default());
        };

        let mut profile = self
            .profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))?;

        if profile.hwnd.take().is_some() {
            log::warn!("Profile '{}' sets hwnd, ignoring it", name);
        }
        log::debug!("Using profile '{}': {:?}", name, profile);
        Ok(profile)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    UnknownProfile(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Parse(e) => write!(f, "Parse error: {}", e),
            Self::UnknownProfile(name) => write!(f, "Unknown profile '{}'", name),
        }
    }
}

impl std::error::Error for ConfigError {}
