//! `ralph config`: show or initialise the settings file.

use std::io::{self, Write};

use anyhow::Result;
use ralph_core::{Settings, save_settings};

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub fn execute(ctx: &CliContext, path: bool, init: bool) -> Result<()> {
    let config_path = &ctx.config.config_path;
    let mut stdout = io::stdout().lock();

    if path {
        writeln!(stdout, "{}", config_path.display())?;
        return Ok(());
    }

    if init {
        if config_path.exists() {
            writeln!(stdout, "Settings file already exists: {}", config_path.display())?;
        } else {
            save_settings(config_path, &Settings::with_defaults()).map_err(CliError::from)?;
            writeln!(stdout, "Wrote default settings to {}", config_path.display())?;
        }
        return Ok(());
    }

    let effective = effective_settings(ctx.settings());
    writeln!(stdout, "{}", serde_json::to_string_pretty(&effective)?)?;
    Ok(())
}

/// Settings with every unset field replaced by the value in effect.
fn effective_settings(settings: &Settings) -> Settings {
    let defaults = Settings::with_defaults();
    Settings {
        log_max_lines: settings.log_max_lines.or(defaults.log_max_lines),
        auto_respond_delay_ms: settings.auto_respond_delay_ms.or(defaults.auto_respond_delay_ms),
        stop_timeout_secs: settings.stop_timeout_secs.or(defaults.stop_timeout_secs),
        kill_timeout_secs: settings.kill_timeout_secs.or(defaults.kill_timeout_secs),
        watch_poll_interval_ms: settings.watch_poll_interval_ms.or(defaults.watch_poll_interval_ms),
        watch_wait_interval_ms: settings.watch_wait_interval_ms.or(defaults.watch_wait_interval_ms),
        history_lines: settings.history_lines.or(defaults.history_lines),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{CliConfig, bootstrap};
    use tempfile::TempDir;

    #[test]
    fn test_effective_settings_fill_gaps() {
        let settings = Settings {
            log_max_lines: Some(42),
            ..Settings::default()
        };
        let effective = effective_settings(&settings);
        assert_eq!(effective.log_max_lines, Some(42));
        assert_eq!(effective.history_lines, Settings::with_defaults().history_lines);
    }

    #[tokio::test]
    async fn test_init_writes_defaults_once() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("nested").join("config.json");
        let ctx = bootstrap(CliConfig {
            config_path: config_path.clone(),
            settings: Settings::default(),
        });

        execute(&ctx, false, true).unwrap();
        let written = std::fs::read_to_string(&config_path).unwrap();
        let loaded: Settings = serde_json::from_str(&written).unwrap();
        assert_eq!(loaded, Settings::with_defaults());

        std::fs::write(&config_path, r#"{"log_max_lines": 7}"#).unwrap();
        execute(&ctx, false, true).unwrap();
        assert_eq!(
            std::fs::read_to_string(&config_path).unwrap(),
            r#"{"log_max_lines": 7}"#
        );
    }
}
