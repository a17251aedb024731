//! Sync presentation: push, pull, status and diff formatters.

use crate::commands::{PullReport, PushReport, StatusEntry};
use crate::tree::diff::{ChangeKind, DiffEntry};
use crate::tree::path::display_relative;
use owo_colors::OwoColorize;
use std::path::Path;

pub fn format_push_report(report: &PushReport, tag: Option<&str>) -> String {
    let mut s = format!(
        "{}\n  Uploaded: {}\n  Already present: {}",
        report.root, report.uploaded, report.skipped
    );
    if let Some(tag) = tag {
        s.push_str(&format!("\n  Tagged: {}", tag));
    }
    s
}

pub fn format_pull_report(report: &PullReport, target: &Path) -> String {
    format!(
        "Pulled into {}\n  Files: {}\n  Directories: {}",
        target.display(),
        report.files,
        report.directories
    )
}

/// `<cid> <✓|*> <path>`: check for present, star for missing
pub fn format_status(entries: &[StatusEntry], color: bool) -> String {
    entries
        .iter()
        .map(|entry| {
            let path = display_relative(&entry.path);
            let mark = match (entry.present, color) {
                (true, true) => "✓".green().to_string(),
                (false, true) => "*".red().to_string(),
                (true, false) => "✓".to_string(),
                (false, false) => "*".to_string(),
            };
            format!("{} {} {}", entry.cid, mark, path)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_diff(entries: &[DiffEntry], color: bool) -> String {
    if entries.is_empty() {
        return "No changes".to_string();
    }
    entries
        .iter()
        .map(|entry| {
            let line = entry.to_string();
            if !color {
                return line;
            }
            match entry.kind {
                ChangeKind::Added => line.green().to_string(),
                ChangeKind::Removed => line.red().to_string(),
                ChangeKind::Modified => line.yellow().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
