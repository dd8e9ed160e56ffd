//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Compiled-in defaults
    Defaults = 0,
    /// Project-level config ($CWD/taskflow/)
    Project = 1,
    /// User-level config (~/.taskflow/)
    User = 2,
    /// Environment variables
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: TASKFLOW_USER_DIR or ~/.taskflow
        let user_dir = std::env::var("TASKFLOW_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".taskflow")));

        // Project dir: TASKFLOW_PROJECT_DIR or $CWD/taskflow
        let project_dir = std::env::var("TASKFLOW_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("taskflow")));

        Self {
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }
}

/// Read one tier's `config.yaml`, if present and parseable.
fn read_tier(dir: Option<&Path>, tier: ConfigTier) -> Option<(PathBuf, Value)> {
    let file = dir?.join("config.yaml");
    if !file.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(&file) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %file.display(), %tier, error = %e, "Unreadable config file, skipping");
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => {
            debug!(path = %file.display(), %tier, "Loaded config tier");
            Some((file, value))
        }
        Err(e) => {
            warn!(path = %file.display(), %tier, error = %e, "Invalid config file, skipping");
            None
        }
    }
}

/// Values read from the `TASKFLOW_*` environment, applied above every file tier.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub config_path: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<String>,
}

impl EnvOverrides {
    /// Capture the overrides from the process environment.
    pub fn from_env() -> Self {
        Self {
            config_path: std::env::var("TASKFLOW_CONFIG_PATH").ok().map(PathBuf::from),
            db_path: std::env::var("TASKFLOW_DB_PATH").ok().map(PathBuf::from),
            host: std::env::var("TASKFLOW_HOST").ok(),
            port: std::env::var("TASKFLOW_PORT").ok(),
        }
    }

    fn apply(&self, config: &mut Config) {
        if let Some(db_path) = &self.db_path {
            config.server.db_path = db_path.clone();
        }

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }

        if let Some(port) = &self.port {
            match port.parse() {
                Ok(port) => config.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid TASKFLOW_PORT"),
            }
        }
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Highest-priority config file that contributed, if any.
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    pub fn load_with(paths: ConfigPaths, env: &EnvOverrides) -> Result<Self> {
        // An explicit file replaces the tiers entirely
        if let Some(path) = &env.config_path {
            let mut config = Config::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            env.apply(&mut config);
            return Ok(Self {
                paths,
                config,
                config_path: Some(path.clone()),
            });
        }

        let mut tiers: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut config_path = None;

        for (dir, tier) in [
            (paths.project_dir.as_deref(), ConfigTier::Project),
            (paths.user_dir.as_deref(), ConfigTier::User),
        ] {
            if let Some((file, value)) = read_tier(dir, tier) {
                tiers.push(value);
                config_path = Some(file);
            }
        }

        let mut config: Config = serde_json::from_value(deep_merge_all(tiers))?;
        env.apply(&mut config);

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Get the config file path that was used.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
