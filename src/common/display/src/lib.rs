//! Display utilities for Sluice.
//!
//! Provides tree formatting for dataflow graphs and small string helpers.

mod tree;

pub use tree::{DisplayTree, TreeNode};

/// Format a value for display with optional truncation.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Indent a multi-line string.
pub fn indent(s: &str, prefix: &str) -> String {
    s.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
