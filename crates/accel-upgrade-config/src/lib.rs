// accel-upgrade-config - Settings for the upgrade tool
//
// Supports configuration from multiple sources:
// 1. Command-line flags (applied by the binary, highest priority)
// 2. Environment variables (ACCEL_UPGRADE_* prefix)
// 3. Config file path from ACCEL_UPGRADE_CONFIG env var
// 4. Default config file location (./accel-upgrade.toml)
// 5. Built-in defaults (lowest priority)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};

pub const DEFAULT_PREFIX: &str = "ASEA-";
pub const DEFAULT_CORE_OU: &str = "core";
pub const DEFAULT_OUTPUT_PATH: &str = "update-config.json";
pub const DEFAULT_ORIGINAL_COPY_PATH: &str = "prettier-config.json";

/// Main runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub accelerator: AcceleratorConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Which accelerator installation the tool targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceleratorConfig {
    /// Prefix of the installation's resources, e.g. `ASEA-`
    pub prefix: String,
    /// Home region; no default, must come from a file, env or flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Key of the OU renamed to `Security`
    pub core_ou: String,
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            region: None,
            core_ou: DEFAULT_CORE_OU.to_string(),
        }
    }
}

/// Where converted documents are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    /// Also write a pretty-printed copy of the untouched input
    pub write_original_copy: bool,
    pub original_copy_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_OUTPUT_PATH.to_string(),
            write_original_copy: true,
            original_copy_path: DEFAULT_ORIGINAL_COPY_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from file and environment, then validate
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Load configuration from an explicit file (for the CLI `--settings` flag)
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
