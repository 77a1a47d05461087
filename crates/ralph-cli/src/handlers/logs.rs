//! `ralph logs`: print a page of a log file.

use std::io::{self, Write};

use anyhow::Result;
use ralph_core::{LogLevel, parse_log_line};
use ralph_runtime::read_log_file;

use crate::commands::LogsArgs;

use super::print_lines;

/// Keep the lines matching `keyword` (case-insensitive) and mentioning
/// `level`, with their 1-based line numbers in the file.
pub(crate) fn filter_lines(
    lines: Vec<String>,
    first_line: usize,
    keyword: Option<&str>,
    level: Option<LogLevel>,
) -> Vec<(usize, String)> {
    let keyword = keyword.filter(|k| !k.is_empty()).map(str::to_lowercase);
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| (first_line + i, line))
        .filter(|(_, line)| {
            keyword
                .as_deref()
                .is_none_or(|k| line.to_lowercase().contains(k))
        })
        .filter(|(_, line)| level.is_none_or(|level| level.matches_text(line)))
        .collect()
}

pub async fn execute(args: LogsArgs) -> Result<()> {
    let lines = read_log_file(&args.file, args.max_lines, args.offset).await;
    let selected = filter_lines(lines, args.offset + 1, args.keyword.as_deref(), args.level);

    if !args.json {
        let lines: Vec<String> = selected.into_iter().map(|(_, line)| line).collect();
        print_lines(&lines)?;
        return Ok(());
    }

    let source = args.file.display().to_string();
    let mut stdout = io::stdout().lock();
    for (number, line) in selected {
        let entry = parse_log_line(&line, number, &source);
        writeln!(stdout, "{}", serde_json::to_string(&entry)?)?;
    }
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<String> {
        [
            "[INFO] Starting iteration",
            "[ERROR] Build failed",
            "plain output",
            "[WARN] Retrying build",
        ]
        .iter()
        .map(ToString::to_string)
        .collect()
    }

    #[test]
    fn test_filter_numbers_lines_from_offset() {
        let selected = filter_lines(lines(), 11, None, None);
        assert_eq!(selected.first(), Some(&(11, "[INFO] Starting iteration".to_string())));
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn test_filter_keyword_and_level() {
        let selected = filter_lines(lines(), 1, Some("BUILD"), None);
        assert_eq!(
            selected,
            vec![
                (2, "[ERROR] Build failed".to_string()),
                (4, "[WARN] Retrying build".to_string())
            ]
        );

        let selected = filter_lines(lines(), 1, Some("build"), Some(LogLevel::Error));
        assert_eq!(selected, vec![(2, "[ERROR] Build failed".to_string())]);
    }

    #[test]
    fn test_empty_keyword_keeps_everything() {
        assert_eq!(filter_lines(lines(), 1, Some(""), None).len(), 4);
    }
}
