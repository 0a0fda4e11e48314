//! Configuration for the `editorial` CLI, read from `.editorial/editorial.toml`.
//!
//! Settings are layered file → environment → CLI:
//!
//! | Setting     | File                 | Environment          | CLI           |
//! |-------------|----------------------|----------------------|---------------|
//! | data dir    | `[storage] data_dir` | `EDITORIAL_DATA_DIR` | `--data-dir`  |
//! | log filter  | `[logging] level`    | `EDITORIAL_LOG`, `RUST_LOG` | `--verbose` |
//! | log format  | `[logging] format`   |                      | `--log-format`|
//!
//! # Configuration File Format
//!
//! ```toml
//! [policy]
//! min_eeat_score = 65
//! auto_approve_above_score = 88
//! ymyl_requires_manual_review = true
//!
//! [storage]
//! data_dir = "data"
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```
//!
//! `[policy]` only names the fields it changes; everything else keeps the
//! stored policy. Per-topic thresholds are learned and cannot be configured.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::review::{PolicyOverride, ReviewPolicy};

/// Name of the per-project configuration directory.
pub const EDITORIAL_DIR: &str = ".editorial";
/// Name of the configuration file inside [`EDITORIAL_DIR`].
pub const CONFIG_FILE: &str = "editorial.toml";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format '{}'. Valid values: text, json", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSection {
    /// Data directory, relative to `.editorial/` unless absolute.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// The complete editorial.toml structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorialToml {
    #[serde(default)]
    pub policy: PolicyOverride,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl EditorialToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse editorial.toml")
    }

    /// Load `<editorial_dir>/editorial.toml`, or defaults when it doesn't exist.
    pub fn load_or_default(editorial_dir: &Path) -> Result<Self> {
        let config_path = editorial_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize editorial.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// The default policy with `[policy]` applied.
    pub fn effective_policy(&self) -> ReviewPolicy {
        ReviewPolicy::default().merged(&self.policy)
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.effective_policy().validate();
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            warnings.push(format!(
                "Invalid logging level '{}': expected one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            ));
        }
        warnings
    }
}

/// Resolved configuration for one CLI invocation.
#[derive(Debug, Clone)]
pub struct EditorialConfig {
    pub project_dir: PathBuf,
    pub editorial_dir: PathBuf,
    pub toml: EditorialToml,
    /// CLI override: verbose logging
    pub verbose: bool,
    /// CLI override for the data directory
    pub cli_data_dir: Option<PathBuf>,
    /// CLI override for the log format
    pub cli_log_format: Option<LogFormat>,
}

impl EditorialConfig {
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let editorial_dir = project_dir.join(EDITORIAL_DIR);
        let toml = EditorialToml::load_or_default(&editorial_dir)?;

        Ok(Self {
            project_dir,
            editorial_dir,
            toml,
            verbose: false,
            cli_data_dir: None,
            cli_log_format: None,
        })
    }

    pub fn with_cli_args(
        project_dir: PathBuf,
        data_dir: Option<PathBuf>,
        verbose: bool,
        log_format: Option<LogFormat>,
    ) -> Result<Self> {
        let mut config = Self::new(project_dir)?;
        config.cli_data_dir = data_dir;
        config.verbose = verbose;
        config.cli_log_format = log_format;
        Ok(config)
    }

    pub fn config_file(&self) -> PathBuf {
        self.editorial_dir.join(CONFIG_FILE)
    }

    /// Data directory (CLI → `EDITORIAL_DATA_DIR` → file → default).
    pub fn data_dir(&self) -> PathBuf {
        let env = std::env::var_os("EDITORIAL_DATA_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        self.resolve_data_dir(env)
    }

    fn resolve_data_dir(&self, env: Option<PathBuf>) -> PathBuf {
        if let Some(dir) = &self.cli_data_dir {
            return dir.clone();
        }
        if let Some(dir) = env {
            return dir;
        }
        let configured = &self.toml.storage.data_dir;
        if configured.is_absolute() {
            configured.clone()
        } else {
            self.editorial_dir.join(configured)
        }
    }

    /// Tracing filter directive (`--verbose` → `EDITORIAL_LOG` → `RUST_LOG` → file).
    pub fn log_filter(&self) -> String {
        let env = std::env::var("EDITORIAL_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .filter(|v| !v.trim().is_empty());
        self.resolve_log_filter(env)
    }

    fn resolve_log_filter(&self, env: Option<String>) -> String {
        if self.verbose {
            return "editorial=debug".to_string();
        }
        env.unwrap_or_else(|| format!("editorial={}", self.toml.logging.level.to_lowercase()))
    }

    /// Log format (CLI → file).
    pub fn log_format(&self) -> LogFormat {
        self.cli_log_format.unwrap_or(self.toml.logging.format)
    }

    pub fn policy_override(&self) -> &PolicyOverride {
        &self.toml.policy
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}
