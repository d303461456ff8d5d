//! Configuration loading and discovery for `bmpack.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::PackerConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for when no config path is given
pub const CONFIG_FILE_NAME: &str = "bmpack.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse bmpack.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override pack root directory
    pub input: Option<PathBuf>,
    /// Override output directory
    pub output: Option<PathBuf>,
    /// Override worker count
    pub jobs: Option<usize>,
    /// Override fail-fast mode
    pub fail_fast: Option<bool>,
    /// Override the confirmation prompt
    pub confirm: Option<bool>,
}

/// Find bmpack.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for bmpack.toml
/// 2. Check XDG_CONFIG_HOME/bmpack/bmpack.toml (or ~/.config/bmpack/bmpack.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find bmpack.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("bmpack").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find bmpack.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a bmpack.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns a default
/// configuration.
pub fn load_config(path: Option<&Path>) -> Result<PackerConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<PackerConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: PackerConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Configuration used when no bmpack.toml is found.
pub fn default_config() -> PackerConfig {
    PackerConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut PackerConfig, overrides: &CliOverrides) {
    if let Some(ref input) = overrides.input {
        config.pack.input = input.clone();
    }

    if let Some(ref output) = overrides.output {
        config.pack.output = output.clone();
    }

    if let Some(jobs) = overrides.jobs {
        config.build.jobs = jobs;
    }

    if let Some(fail_fast) = overrides.fail_fast {
        config.build.fail_fast = fail_fast;
    }

    if let Some(confirm) = overrides.confirm {
        config.build.confirm = confirm;
    }
}

/// Resolve a path relative to a base directory.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with `base`.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"[build]\njobs = 2")
            .expect("should write config content");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).expect("should create config file");

        let subdir = temp.path().join("Dolphin").join("Anims");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &config_path,
            r#"
[pack]
output = "dist"

[build]
jobs = 3
confirm = false
"#,
        )
        .expect("should write config content");

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.pack.output, PathBuf::from("dist"));
        assert_eq!(config.build.jobs, 3);
        assert!(!config.build.confirm);
    }

    #[test]
    fn test_load_config_missing_file_errors() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "this is not valid toml {{{").expect("should write config");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[build]\njobs = 0\n").expect("should write config");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = default_config();
        let overrides = CliOverrides {
            output: Some(PathBuf::from("out")),
            jobs: Some(8),
            confirm: Some(false),
            ..Default::default()
        };

        merge_cli_overrides(&mut config, &overrides);
        assert_eq!(config.pack.input, PathBuf::from("."));
        assert_eq!(config.pack.output, PathBuf::from("out"));
        assert_eq!(config.build.jobs, 8);
        assert!(!config.build.fail_fast);
        assert!(!config.build.confirm);
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/packs");
        assert_eq!(resolve_path(root, Path::new("/other")), PathBuf::from("/other"));
        assert_eq!(resolve_path(root, Path::new("asset_packs")), PathBuf::from("/packs/asset_packs"));
    }
}
