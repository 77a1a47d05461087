//! `ralph parse`: parse log lines from stdin into JSON records.

use std::io::Write;

use anyhow::Result;
use ralph_core::parse_log_line;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn execute(source: &str) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut number = 0;

    while let Some(line) = lines.next_line().await? {
        number += 1;
        let entry = parse_log_line(&line, number, source);
        let json = serde_json::to_string(&entry)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{json}")?;
        stdout.flush()?;
    }

    Ok(())
}
