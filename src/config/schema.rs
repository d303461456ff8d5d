//! Configuration schema types for `bmpack.toml`
//!
//! Defines the structure and validation rules for packer configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source and destination of a packing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackConfig {
    /// Root directory whose subdirectories are asset packs
    #[serde(default = "default_input")]
    pub input: PathBuf,
    /// Output directory, relative to `input` unless absolute
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self { input: default_input(), output: default_output() }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from(".")
}

fn default_output() -> PathBuf {
    PathBuf::from("asset_packs")
}

/// Execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Worker threads used to encode the frames of one asset
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Abort the run on the first failed asset
    #[serde(default)]
    pub fail_fast: bool,
    /// Ask for confirmation before touching the output directory
    #[serde(default = "default_confirm")]
    pub confirm: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { jobs: default_jobs(), fail_fast: false, confirm: default_confirm() }
    }
}

fn default_jobs() -> usize {
    1
}

fn default_confirm() -> bool {
    true
}

/// Complete bmpack.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Input and output locations
    #[serde(default)]
    pub pack: PackConfig,
    /// Execution settings
    #[serde(default)]
    pub build: BuildConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "build.jobs")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bmpack.toml: '{}' {}", self.field, self.message)
    }
}

impl PackerConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.pack.output.as_os_str().is_empty() {
            errors.push(ConfigValidationError {
                field: "pack.output".to_string(),
                message: "must be a non-empty path".to_string(),
            });
        }

        if self.build.jobs == 0 {
            errors.push(ConfigValidationError {
                field: "build.jobs".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_parse() {
        let config: PackerConfig = toml::from_str("").unwrap();
        assert_eq!(config.pack.input, PathBuf::from("."));
        assert_eq!(config.pack.output, PathBuf::from("asset_packs"));
        assert_eq!(config.build.jobs, 1);
        assert!(!config.build.fail_fast);
        assert!(config.build.confirm);
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[pack]
input = "assets"
output = "/tmp/packs"

[build]
jobs = 4
fail_fast = true
confirm = false
"#;
        let config: PackerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.pack.input, PathBuf::from("assets"));
        assert_eq!(config.pack.output, PathBuf::from("/tmp/packs"));
        assert_eq!(config.build.jobs, 4);
        assert!(config.build.fail_fast);
        assert!(!config.build.confirm);
    }

    #[test]
    fn test_validation_zero_jobs() {
        let config: PackerConfig = toml::from_str("[build]\njobs = 0\n").unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "build.jobs"));
    }

    #[test]
    fn test_validation_empty_output() {
        let config: PackerConfig = toml::from_str("[pack]\noutput = \"\"\n").unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "pack.output"));
        assert_eq!(errors[0].to_string(), "bmpack.toml: 'pack.output' must be a non-empty path");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config: PackerConfig = toml::from_str("[pack]\nextra = 1\n").unwrap();
        assert!(config.is_valid());
    }
}
