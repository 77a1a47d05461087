//! Shared types for process management.

use std::path::PathBuf;
use std::time::Duration;

use ralph_core::Settings;
use ralph_core::settings::{
    DEFAULT_AUTO_RESPOND_DELAY_MS, DEFAULT_KILL_TIMEOUT_SECS, DEFAULT_STOP_TIMEOUT_SECS,
};

/// What to launch for a project.
///
/// Command construction is the caller's job; this is the already-resolved
/// argument vector and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Project (entity) name the process is bound to.
    pub project: String,
    /// Argument vector; the first element is the program.
    pub command: Vec<String>,
    /// Working directory for the process.
    pub cwd: PathBuf,
    /// Responses written verbatim to stdin, one per settle delay.
    pub auto_respond: Vec<String>,
}

impl LaunchSpec {
    /// Create a launch spec with required fields.
    pub fn new(
        project: impl Into<String>,
        command: impl IntoIterator<Item = impl Into<String>>,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self {
            project: project.into(),
            command: command.into_iter().map(Into::into).collect(),
            cwd: cwd.into(),
            auto_respond: Vec::new(),
        }
    }

    /// Set the scripted stdin responses.
    #[must_use]
    pub fn with_auto_respond(mut self, responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.auto_respond = responses.into_iter().map(Into::into).collect();
        self
    }

    /// Program name (first argument), if any.
    #[must_use]
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }
}

/// Timing knobs for supervised processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Grace period after SIGTERM before escalating.
    pub stop_timeout: Duration,
    /// Wait after the forceful kill.
    pub kill_timeout: Duration,
    /// Settle delay before each scripted stdin response.
    pub auto_respond_delay: Duration,
}

impl SupervisorConfig {
    /// Build from persisted settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            stop_timeout: settings.effective_stop_timeout(),
            kill_timeout: settings.effective_kill_timeout(),
            auto_respond_delay: settings.effective_auto_respond_delay(),
        }
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            stop_timeout: Duration::from_secs(DEFAULT_STOP_TIMEOUT_SECS),
            kill_timeout: Duration::from_secs(DEFAULT_KILL_TIMEOUT_SECS),
            auto_respond_delay: Duration::from_millis(DEFAULT_AUTO_RESPOND_DELAY_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_spec_builder() {
        let spec = LaunchSpec::new("alpha", ["ralph-tui", "run", "--headless"], "/tmp/alpha")
            .with_auto_respond(["y\n"]);
        assert_eq!(spec.program(), Some("ralph-tui"));
        assert_eq!(spec.command.len(), 3);
        assert_eq!(spec.auto_respond, vec!["y\n".to_string()]);
    }

    #[test]
    fn test_empty_command_has_no_program() {
        let spec = LaunchSpec::new("alpha", Vec::<String>::new(), "/tmp");
        assert_eq!(spec.program(), None);
    }

    #[test]
    fn test_config_from_settings() {
        let settings = Settings {
            stop_timeout_secs: Some(2),
            ..Settings::default()
        };
        let config = SupervisorConfig::from_settings(&settings);
        assert_eq!(config.stop_timeout, Duration::from_secs(2));
        assert_eq!(config.kill_timeout, SupervisorConfig::default().kill_timeout);
    }
}
