//! Shared CLI helpers — path expansion and result printing.

use std::path::{Path, PathBuf};

use colored::Colorize;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print the one-line success summary.
pub fn print_summary(rows: usize, path: &Path) {
    let noun = if rows == 1 { "message" } else { "messages" };
    println!(
        "{} exported {} unread {} to {}",
        "✓".green().bold(),
        rows,
        noun,
        path.display()
    );
}
