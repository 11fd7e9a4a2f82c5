use std::path::Path;

use nidscope_core::analysis::{NidStatus, VersionStep};

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}

/// One-cell summary of a version step, e.g. `14 NIDs: 12 known, 2 unknown *`.
///
/// A trailing `*` marks a version whose NIDs were (re-)randomized.
pub fn version_cell(step: &VersionStep) -> String {
    let mut parts = Vec::new();
    for status in NidStatus::ALL {
        let count = step.result.count(status);
        if count > 0 {
            parts.push(format!("{count} {status}"));
        }
    }
    let mut cell = format!("{} NIDs", step.result.total);
    if !parts.is_empty() {
        cell.push_str(": ");
        cell.push_str(&parts.join(", "));
    }
    if step.randomized {
        cell.push_str(" *");
    }
    cell
}
