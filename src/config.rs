//! Configuration management for cmdr.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values
//!
//! The file also carries the template catalog: named [`CommandTemplate`]s
//! that can be run with `cmdr -n <NAME>`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::execution::CommandTemplate;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration.
    pub logging: LoggingSection,
    /// Named command templates.
    pub templates: BTreeMap<String, CommandTemplate>,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level or filter directive (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(level) = std::env::var("CMDR_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env();
        config.apply_args(args);
        Ok(config)
    }

    /// Look up a catalog template by name.
    pub fn template(&self, name: &str) -> Result<&CommandTemplate, ConfigError> {
        self.templates
            .get(name)
            .ok_or_else(|| ConfigError::UnknownTemplate(name.to_string()))
    }

    /// Build the template to run from the catalog or the command line.
    ///
    /// Command-line directory, user and mode flags override the catalog
    /// entry. A deadline implies asynchronous delivery.
    pub fn command_for(&self, args: &Args) -> Result<CommandTemplate, ConfigError> {
        let mut template = match (&args.name, &args.program) {
            (Some(name), _) => self.template(name)?.clone(),
            (None, Some(program)) => CommandTemplate::new(program.as_str()),
            (None, None) => return Err(ConfigError::MissingCommand),
        };

        if let Some(ref args_template) = args.arg_template {
            template.args = args_template.clone();
        }
        if let Some(ref dir) = args.working_dir {
            template.working_dir = Some(dir.clone());
        }
        if let Some(ref user) = args.user {
            template.user = Some(user.clone());
        }
        template.asynchronous |= args.asynchronous || args.timeout.is_some();
        Ok(template)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// No catalog entry with this name.
    UnknownTemplate(String),
    /// Neither a program nor a template name was given.
    MissingCommand,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::UnknownTemplate(name) => write!(f, "unknown template: {}", name),
            Self::MissingCommand => write!(f, "no program or template name given"),
        }
    }
}

impl std::error::Error for ConfigError {}
