//! Reading and writing arrangement settings.
//!
//! Serialization writes the tokens a rule set was built from, not the
//! flattened rules, so aliases survive a round trip. Built-in aliases are
//! never written.

use crate::error::ConfigError;
use crate::models::settings::Settings;
use crate::rules::RuleSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettingsFormat {
    #[default]
    Toml,
    Yaml,
    Json,
}

impl SettingsFormat {
    /// Format from a file extension; unknown extensions read as TOML.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

impl FromStr for SettingsFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown settings format `{other}`")),
        }
    }
}

/// Settings codec with fallback defaults for sections a document leaves out.
#[derive(Debug, Clone)]
pub struct SettingsSerializer {
    defaults: Settings,
}

impl Default for SettingsSerializer {
    fn default() -> Self {
        Self::new(Settings::builtin())
    }
}

impl SettingsSerializer {
    pub fn new(defaults: Settings) -> Self {
        Self { defaults }
    }

    pub fn deserialize(&self, text: &str, format: SettingsFormat) -> Result<RuleSet, ConfigError> {
        let parse_err = |message: String| ConfigError::Parse {
            format: format.as_str(),
            message,
        };
        let settings: Settings = match format {
            SettingsFormat::Toml => toml::from_str(text).map_err(|e| parse_err(e.to_string()))?,
            SettingsFormat::Yaml if text.trim().is_empty() => Settings::default(),
            SettingsFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|e| parse_err(e.to_string()))?
            }
            SettingsFormat::Json => {
                serde_json::from_str(text).map_err(|e| parse_err(e.to_string()))?
            }
        };
        RuleSet::from_settings(settings.or_defaults(&self.defaults))
    }

    pub fn serialize(
        &self,
        rules: &RuleSet,
        format: SettingsFormat,
    ) -> Result<String, ConfigError> {
        let settings = rules.settings();
        let ser_err = |message: String| ConfigError::Serialize {
            format: format.as_str(),
            message,
        };
        match format {
            SettingsFormat::Toml => toml::to_string(settings).map_err(|e| ser_err(e.to_string())),
            SettingsFormat::Yaml => {
                serde_yaml::to_string(settings).map_err(|e| ser_err(e.to_string()))
            }
            SettingsFormat::Json => {
                serde_json::to_string_pretty(settings).map_err(|e| ser_err(e.to_string()))
            }
        }
    }

    /// Read a settings file, picking the format from its extension.
    pub fn load(&self, path: &Path) -> Result<RuleSet, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading settings");
        self.deserialize(&text, SettingsFormat::from_path(path))
    }
}
