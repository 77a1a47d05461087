//! Available commands and their arguments.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use ralph_core::LogLevel;
use ralph_runtime::logs::DEFAULT_PAGE_LINES;

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Launch a command under supervision and stream its logs
    Run(RunArgs),

    /// Follow a log file from its end until interrupted
    Tail {
        /// Log file to follow (may not exist yet)
        file: PathBuf,
    },

    /// Print a page of a log file
    Logs(LogsArgs),

    /// Parse log lines from stdin into JSON records
    Parse {
        /// Source name recorded in each entry
        #[arg(long, default_value = "stdin")]
        source: String,
    },

    /// Show the effective settings
    Config {
        /// Print the settings file path instead
        #[arg(long)]
        path: bool,
        /// Write the default settings if no settings file exists
        #[arg(long, conflicts_with = "path")]
        init: bool,
    },
}

/// Arguments of `ralph run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Project name the process is bound to
    #[arg(short, long)]
    pub project: String,

    /// Working directory (defaults to the current directory)
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Extra log file to tail into the project's log (repeatable)
    #[arg(long = "watch", value_name = "FILE")]
    pub watch: Vec<PathBuf>,

    /// Line written to stdin after the settle delay (repeatable, in order)
    #[arg(long = "auto-respond", value_name = "TEXT")]
    pub auto_respond: Vec<String>,

    /// Command to run
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

/// Arguments of `ralph logs`.
#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Log file to read
    pub file: PathBuf,

    /// Lines to skip from the start of the file
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Maximum lines to print
    #[arg(long, default_value_t = DEFAULT_PAGE_LINES)]
    pub max_lines: usize,

    /// Only lines containing this text (case-insensitive)
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Only lines mentioning this level (debug, info, warn, error, critical)
    #[arg(short, long)]
    pub level: Option<LogLevel>,

    /// Print parsed entries as JSON lines
    #[arg(long)]
    pub json: bool,
}
