//! Discovery of a project's log files.

use std::fs;
use std::path::{Path, PathBuf};

/// Directories searched for `*.log` and `*.txt` files, in order.
const LOG_DIRS: [&[&str]; 3] = [&[".ralph-tui", "logs"], &["logs"], &[".ralph-tui"]];

/// Directory whose every file is an iteration log.
const ITERATION_DIR: [&str; 2] = [".ralph-tui", "iterations"];

fn join(base: &Path, parts: &[&str]) -> PathBuf {
    parts.iter().fold(base.to_path_buf(), |path, part| path.join(part))
}

/// Regular files in `dir` matching `keep`, newest name first. Dotfiles are
/// included.
fn files_in(dir: &Path, keep: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .map(|entry| entry.path())
        .filter(|path| keep(path))
        .collect();
    files.sort_unstable_by(|a, b| b.cmp(a));
    files
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

/// Find the log files of the project rooted at `project_dir`.
///
/// For each of `.ralph-tui/logs`, `logs` and `.ralph-tui`: the `*.log` files,
/// then the `*.txt` files, each group in reverse name order. Then every file
/// of `.ralph-tui/iterations`, in reverse name order. Missing directories are
/// skipped.
pub fn find_log_files(project_dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for parts in LOG_DIRS {
        let dir = join(project_dir, parts);
        if !dir.is_dir() {
            continue;
        }
        found.extend(files_in(&dir, |p| has_extension(p, "log")));
        found.extend(files_in(&dir, |p| has_extension(p, "txt")));
    }

    let iterations = join(project_dir, &ITERATION_DIR);
    if iterations.is_dir() {
        found.extend(files_in(&iterations, |_| true));
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(base: &Path, rel: &str) {
        let path = base.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_discovery_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, ".ralph-tui/logs/a.log");
        touch(root, ".ralph-tui/logs/b.log");
        touch(root, ".ralph-tui/logs/notes.txt");
        touch(root, ".ralph-tui/logs/.previous.log");
        touch(root, ".ralph-tui/logs/ignored.json");
        touch(root, "logs/run.log");
        touch(root, ".ralph-tui/session.log");
        touch(root, ".ralph-tui/iterations/001.md");
        touch(root, ".ralph-tui/iterations/002.md");
        touch(root, ".ralph-tui/iterations/.hidden");
        fs::create_dir_all(root.join(".ralph-tui/iterations/subdir")).unwrap();

        let found: Vec<String> = find_log_files(root)
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().display().to_string())
            .collect();

        assert_eq!(
            found,
            vec![
                ".ralph-tui/logs/b.log",
                ".ralph-tui/logs/a.log",
                ".ralph-tui/logs/.previous.log",
                ".ralph-tui/logs/notes.txt",
                "logs/run.log",
                ".ralph-tui/session.log",
                ".ralph-tui/iterations/002.md",
                ".ralph-tui/iterations/001.md",
                ".ralph-tui/iterations/.hidden",
            ]
        );
    }

    #[test]
    fn test_empty_project() {
        let dir = TempDir::new().unwrap();
        assert!(find_log_files(dir.path()).is_empty());
        assert!(find_log_files(&dir.path().join("missing")).is_empty());
    }
}
