//! CLI bootstrap - the composition root.
//!
//! Settings are resolved and loaded here, and the `Supervisor` is built
//! from them. Command handlers receive the composed context.

use std::path::PathBuf;

use ralph_core::{Settings, config_file_path, load_settings};
use ralph_runtime::Supervisor;
use tracing::debug;

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Settings file the settings were loaded from.
    pub config_path: PathBuf,
    /// Loaded (or default) settings.
    pub settings: Settings,
}

impl CliConfig {
    /// Load settings from `config_path`, or from the default location.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, CliError> {
        let config_path = match config_path {
            Some(path) => path,
            None => config_file_path()?,
        };
        let settings = load_settings(&config_path)?;
        debug!(path = %config_path.display(), ?settings, "Settings loaded");
        Ok(Self {
            config_path,
            settings,
        })
    }
}

/// Fully composed context for CLI commands.
#[derive(Debug)]
pub struct CliContext {
    pub config: CliConfig,
    pub supervisor: Supervisor,
}

impl CliContext {
    pub const fn settings(&self) -> &Settings {
        &self.config.settings
    }
}

/// Build the CLI context from its configuration.
pub fn bootstrap(config: CliConfig) -> CliContext {
    let supervisor = Supervisor::new(&config.settings);
    CliContext { config, supervisor }
}
