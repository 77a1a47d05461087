//! Command handlers.
//!
//! Handlers are thin: they turn arguments into supervisor or log-layer calls
//! and print the results. Log lines go to stdout; diagnostics go through
//! tracing to stderr.

pub mod config;
pub mod logs;
pub mod parse;
pub mod run;
pub mod tail;

use std::io::{self, Write};

/// Print lines to stdout, flushing once.
pub(crate) fn print_lines(lines: &[String]) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{line}")?;
    }
    stdout.flush()
}
