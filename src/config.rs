//! User configuration management
//!
//! Configuration is optional and stored in TOML format at
//! `~/.layerpack/config.toml`. A missing file means defaults.
//!
//! # Examples
//!
//! ```no_run
//! use layerpack::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//!
//! println!("Installer: {}", config.installer.program);
//! println!("Default runtime: {}", config.layer.default_runtime);
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Runtime used when neither the CLI nor the config file names one
pub const DEFAULT_RUNTIME: &str = "python3.10";

/// User configuration file (`~/.layerpack/config.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Package installer settings
    #[serde(default)]
    pub installer: InstallerConfig,

    /// Layer defaults
    #[serde(default)]
    pub layer: LayerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallerConfig {
    /// Executable to run (e.g. `pip`, `pip3`, `python3`)
    #[serde(default = "default_installer_program")]
    pub program: String,

    /// Arguments placed before `install` (e.g. `["-m", "pip"]` with `python3`)
    #[serde(default)]
    pub args: Vec<String>,

    /// Arguments appended to every install invocation
    /// (e.g. `["--platform", "manylinux2014_x86_64", "--only-binary=:all:"]`)
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_installer_program() -> String {
    "pip".to_string()
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            program: default_installer_program(),
            args: Vec::new(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Runtime used when `--python-version` is not given
    #[serde(default = "default_runtime")]
    pub default_runtime: String,
}

fn default_runtime() -> String {
    DEFAULT_RUNTIME.to_string()
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            default_runtime: default_runtime(),
        }
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// Uses LAYERPACK_CONFIG_DIR if set, otherwise ~/.layerpack/config.toml
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(config_dir) = std::env::var("LAYERPACK_CONFIG_DIR") {
            return Ok(PathBuf::from(config_dir).join("config.toml"));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| Error::Other("Could not find home directory".to_string()))?;

        Ok(home.join(".layerpack").join("config.toml"))
    }

    /// Load config from file, or defaults if it doesn't exist
    ///
    /// Environment variable overrides:
    /// - `LAYERPACK_INSTALLER`: Overrides `installer.program`
    /// - `LAYERPACK_CONFIG_DIR`: Overrides the config directory location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;

        let mut config = if !path.exists() {
            Self::default()
        } else {
            let content = fs::read_to_string(&path)?;
            Self::from_toml(&content)?
        };

        if let Ok(program) = std::env::var("LAYERPACK_INSTALLER") {
            if !program.is_empty() {
                config.installer.program = program;
            }
        }

        tracing::debug!("Loaded config (installer: {})", config.installer.program);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.installer.program, "pip");
        assert!(config.installer.args.is_empty());
        assert!(config.installer.extra_args.is_empty());
        assert_eq!(config.layer.default_runtime, "python3.10");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_toml(
            r#"[installer]
program = "python3"
args = ["-m", "pip"]
"#,
        )
        .unwrap();
        assert_eq!(config.installer.program, "python3");
        assert_eq!(config.installer.args, vec!["-m", "pip"]);
        assert_eq!(config.layer.default_runtime, DEFAULT_RUNTIME);
    }

    #[test]
    fn test_config_roundtrip_through_toml() {
        let mut config = Config::default();
        config.layer.default_runtime = "python3.12".to_string();
        config.installer.extra_args = vec!["--only-binary=:all:".to_string()];

        let toml_string = toml::to_string_pretty(&config).unwrap();
        let parsed = Config::from_toml(&toml_string).unwrap();
        assert_eq!(parsed.layer.default_runtime, "python3.12");
        assert_eq!(parsed.installer.extra_args, vec!["--only-binary=:all:"]);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let result = Config::from_toml("[installer]\nprogram = 5\n");
        assert!(matches!(result, Err(Error::TomlDe(_))));
    }
}
