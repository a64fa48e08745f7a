//! Process configuration.
//!
//! Loaded from a json5 file; every section has serde defaults so a missing
//! file or an empty object is a valid configuration. Relative paths resolve
//! against the config file's directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{mention::policy::MentionPolicy, runner::http::RunnerConfig};

pub const DEFAULT_CONFIG_PATH: &str = "moot.json5";

fn default_logging_dir() -> PathBuf {
    PathBuf::from("./logs/moot")
}

fn default_logging_filter() -> String {
    "info".to_string()
}

fn default_logging_rotation() -> LoggingRotation {
    LoggingRotation::Daily
}

fn default_logging_retention_days() -> usize {
    14
}

fn default_true() -> bool {
    true
}

fn default_agents_dir() -> PathBuf {
    PathBuf::from("agents")
}

fn default_workflow_file() -> String {
    "agent.yml".to_string()
}

fn default_footer_max_mentions() -> usize {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoggingRotation {
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_logging_filter")]
    pub filter: String,
    #[serde(default = "default_logging_rotation")]
    pub rotation: LoggingRotation,
    #[serde(default = "default_logging_retention_days")]
    pub retention_days: usize,
    #[serde(default = "default_true")]
    pub stderr_warn_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_logging_dir(),
            filter: default_logging_filter(),
            rotation: default_logging_rotation(),
            retention_days: default_logging_retention_days(),
            stderr_warn_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// `owner/repo` the triggers run against. Empty means the current
    /// repository as resolved by `gh` itself.
    #[serde(default)]
    pub repository: String,
    #[serde(default = "default_workflow_file")]
    pub workflow_file: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            repository: String::new(),
            workflow_file: default_workflow_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_agents_dir")]
    pub agents_dir: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            agents_dir: default_agents_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    #[serde(default = "default_footer_max_mentions")]
    pub footer_max_mentions: usize,
    /// Post a compact failure summary for failed agents. Off by default so
    /// broken runs do not spam the thread.
    #[serde(default)]
    pub post_failure_comment: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            footer_max_mentions: default_footer_max_mentions(),
            post_failure_comment: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub mention_policy: MentionPolicy,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let mut config: Config = json5::from_str(&raw)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        if !config.registry.agents_dir.is_absolute() {
            config.registry.agents_dir = base.join(&config.registry.agents_dir);
        }
        if !config.logging.dir.is_absolute() {
            config.logging.dir = base.join(&config.logging.dir);
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path (must exist) or fall back to the default
    /// path, with built-in defaults when no file is present.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    let mut config = Config::default();
                    config.apply_env_overrides();
                    Ok(config)
                }
            }
        }
    }

    /// Environment toggles that override file configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("MOOT_MULTISTAGE") {
            self.runner.multistage_enabled = env_flag(&value, self.runner.multistage_enabled);
        }
        if let Ok(value) = std::env::var("MOOT_POST_FAILURE_COMMENT") {
            self.surface.post_failure_comment =
                env_flag(&value, self.surface.post_failure_comment);
        }
        if self.dispatch.repository.is_empty() {
            if let Ok(repo) = std::env::var("GITHUB_REPOSITORY") {
                self.dispatch.repository = repo;
            }
        }
    }
}

fn env_flag(value: &str, fallback: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => fallback,
    }
}
