//! File utility functions for listing and filtering files.

use std::fs;
use std::path::{Path, PathBuf};

/// Returns paths to all regular files beneath `root`, recursively, whose
/// extension matches one of `extensions`. Extensions are matched
/// case-insensitively.
///
/// The traversal is iterative (explicit directory work-list, no recursion);
/// unreadable directories are skipped. Returns an empty vector when `root`
/// does not exist. No ordering is guaranteed; callers that care sort the
/// result themselves.
pub fn files_with_extensions(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() && matches_extension(&path, extensions) {
                files.push(path);
            }
        }
    }

    files
}

fn matches_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    extensions.contains(&ext.to_lowercase().as_str())
}
