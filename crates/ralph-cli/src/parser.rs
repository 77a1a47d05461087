//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Supervise Ralph agent processes and stream their logs.
#[derive(Debug, Parser)]
#[command(name = "ralph")]
#[command(about = "Supervise Ralph agent processes and stream their logs")]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to ~/.ralph-dashboard/config.json)
    #[arg(long = "config", global = true, env = "RALPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use ralph_core::LogLevel;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["ralph", "--verbose", "--config", "/tmp/ralph.json", "config"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/ralph.json")));
        assert!(matches!(cli.command, Some(Commands::Config { path: false, init: false })));
    }

    #[test]
    fn test_run_takes_trailing_command() {
        let cli = Cli::parse_from([
            "ralph",
            "run",
            "--project",
            "alpha",
            "--watch",
            "a.log",
            "--auto-respond",
            "y",
            "--",
            "ralph-tui",
            "run",
            "--headless",
        ]);
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.project, "alpha");
        assert_eq!(args.watch, vec![PathBuf::from("a.log")]);
        assert_eq!(args.auto_respond, vec!["y".to_string()]);
        assert_eq!(args.command, vec!["ralph-tui", "run", "--headless"]);
    }

    #[test]
    fn test_logs_level_parses_synonyms() {
        let cli = Cli::parse_from(["ralph", "logs", "run.log", "--level", "warn"]);
        let Some(Commands::Logs(args)) = cli.command else {
            panic!("expected logs command");
        };
        assert_eq!(args.level, Some(LogLevel::Warning));
        assert_eq!(args.max_lines, 1000);
        assert_eq!(args.offset, 0);
    }
}
