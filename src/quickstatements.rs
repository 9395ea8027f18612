//! QuickStatements batch output for merge suggestions. The commands are
//! written to a file for manual review, never submitted automatically.

use crate::dup_finder::MergePair;
use chrono::Local;
use std::collections::HashSet;

/// Tab-separated MERGE commands, one per line, duplicates removed while
/// keeping first occurrence.
pub fn merge_commands(pairs: &[MergePair]) -> String {
    let mut seen: HashSet<&MergePair> = HashSet::new();
    let mut out = String::new();
    for pair in pairs {
        if seen.insert(pair) {
            out.push_str(&format!("MERGE\t{}\t{}\n", pair.newer, pair.older));
        }
    }
    out
}

/// First few lines of a command batch, for console preview.
pub fn preview(commands: &str, limit: usize) -> String {
    commands
        .lines()
        .take(limit)
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Timestamped filename carrying the scanned username, with characters
/// unsafe in filenames replaced.
pub fn output_filename(username: &str) -> String {
    let safe: String = username
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!(
        "qs_community_duplicates_{}_{}.csv",
        safe,
        Local::now().format("%Y%m%d_%H%M%S")
    )
}
