//! Configuration management for saltctl.
//!
//! Loads settings from `$SALTCTL_CONFIG` or `<config dir>/saltctl/config.toml`,
//! or uses defaults.

use anyhow::{Context, Result};
use salt_calls::{ClientKind, Target, TargetType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "SALTCTL_CONFIG";

/// How requests are rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Salt API client interface
    #[serde(default)]
    pub client: ClientKind,

    /// Target used when a call has none
    #[serde(default)]
    pub target: Option<String>,

    #[serde(default)]
    pub target_type: TargetType,

    /// Ask minions for `{"ret", "retcode"}` returns
    #[serde(default = "default_full_return")]
    pub full_return: bool,
}

fn default_full_return() -> bool {
    true
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            client: ClientKind::default(),
            target: None,
            target_type: TargetType::default(),
            full_return: default_full_return(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_pretty() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

/// Full saltctl configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub request: RequestConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load config from an explicit path, `$SALTCTL_CONFIG`, or the default
    /// location. An explicitly named file must exist and parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load_from_path(Path::new(&path));
        }

        match Self::default_path() {
            Some(path) if path.exists() => Ok(Self::load_from_path(&path).unwrap_or_else(|e| {
                warn!("Ignoring unreadable config, using defaults: {:#}", e);
                Config::default()
            })),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("saltctl").join("config.toml"))
    }

    /// Configured fallback target, if any
    pub fn default_target(&self) -> Option<Target> {
        self.request
            .target
            .as_ref()
            .map(|expr| Target::new(expr.as_str(), self.request.target_type))
    }
}
