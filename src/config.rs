//! Redactor configuration.

use crate::detection::{PiiType, DEFAULT_PLACEHOLDER};
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// Default maximum input size, in characters
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 1_048_576;

/// JSON-serializable configuration for the redactor
///
/// Field names use kebab-case to match typical YAML/JSON config style.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RedactorConfigJson {
    /// Maximum input length in characters
    #[serde(default = "default_max_input_length")]
    pub max_input_length: usize,
    /// Replacement token for every redacted span
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// Type ids to detect (empty = all)
    #[serde(default)]
    pub enabled_types: Vec<String>,
}

fn default_max_input_length() -> usize {
    DEFAULT_MAX_INPUT_LENGTH
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

impl Default for RedactorConfigJson {
    fn default() -> Self {
        Self {
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
            placeholder: default_placeholder(),
            enabled_types: Vec::new(),
        }
    }
}

impl TryFrom<RedactorConfigJson> for RedactorConfig {
    type Error = ConfigError;

    fn try_from(json: RedactorConfigJson) -> Result<Self, Self::Error> {
        if json.max_input_length == 0 {
            return Err(ConfigError::ZeroMaxLength);
        }

        Ok(Self {
            max_input_length: json.max_input_length,
            placeholder: json.placeholder,
            enabled_types: parse_types(json.enabled_types.iter().map(String::as_str))?,
        })
    }
}

/// Configuration for the redaction service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactorConfig {
    /// Maximum input length in characters
    pub max_input_length: usize,
    /// Replacement token for every redacted span
    pub placeholder: String,
    /// Types to detect; evaluated in registry order whatever the order here
    pub enabled_types: Vec<PiiType>,
}

impl Default for RedactorConfig {
    fn default() -> Self {
        Self {
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            enabled_types: PiiType::ALL.to_vec(),
        }
    }
}

impl RedactorConfig {
    /// Load from a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let json: RedactorConfigJson =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        json.try_into()
    }
}

/// Parse type ids; an empty list selects every type
pub fn parse_types<'a>(ids: impl Iterator<Item = &'a str>) -> Result<Vec<PiiType>, ConfigError> {
    let types = ids
        .filter(|id| !id.trim().is_empty())
        .map(|id| id.parse::<PiiType>().map_err(|_| ConfigError::UnknownType(id.to_string())))
        .collect::<Result<Vec<_>, _>>()?;

    if types.is_empty() {
        Ok(PiiType::ALL.to_vec())
    } else {
        Ok(types)
    }
}
