//! # Generation Configuration
//!
//! Tunables for arbitrary sample generation. Every field has a default, so
//! an empty YAML or JSON document yields [`GenerationConfig::default`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for arbitrary sample generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Ceiling for lengths and collection sizes with no upper bound.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Width of the numeric range on any side left open by refinements.
    #[serde(default = "default_number_span")]
    pub number_span: f64,
    /// Composite nesting depth after which collections stop growing and
    /// unions fall back to their first member.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Regex for keys of generated index signatures.
    #[serde(default = "default_key_pattern")]
    pub key_pattern: String,
}

fn default_max_length() -> usize {
    8
}

fn default_number_span() -> f64 {
    1_000_000.0
}

fn default_max_depth() -> usize {
    4
}

fn default_key_pattern() -> String {
    "[a-z]{0,8}".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            number_span: default_number_span(),
            max_depth: default_max_depth(),
            key_pattern: default_key_pattern(),
        }
    }
}

impl GenerationConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(
            GenerationConfig::from_yaml_str("").unwrap(),
            GenerationConfig::default()
        );
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let cfg = GenerationConfig::from_yaml_str("max_depth: 2\nmax_length: 3\n").unwrap();
        assert_eq!(cfg.max_depth, 2);
        assert_eq!(cfg.max_length, 3);
        assert_eq!(cfg.key_pattern, "[a-z]{0,8}");
    }

    #[test]
    fn json_config() {
        let cfg = GenerationConfig::from_json_str(r#"{"number_span": 10.0}"#).unwrap();
        assert_eq!(cfg.number_span, 10.0);
        assert_eq!(cfg.max_length, 8);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(GenerationConfig::from_yaml_str("max_depth: [1").is_err());
        assert!(GenerationConfig::from_json_str("{").is_err());
    }
}
