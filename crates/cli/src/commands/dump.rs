use std::fs;

use anyhow::{Context, Result};
use nidscope_core::db::ProjectContext;
use nidscope_core::services::{render_listing, ListingKind};

use crate::canonicalize_or_current;

/// Print (or write to `out`) one line per record: NIDs or names, optionally
/// filtered to one library and one firmware version.
pub fn dump_command(
    root: &str,
    kind: ListingKind,
    library: Option<&str>,
    firmware: Option<&str>,
    out: Option<&str>,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let mut entries = ctx.db.load_entries(library).context("Failed to load NID records")?;
    if let Some(version) = firmware {
        entries.retain(|e| e.version == version);
    }

    let lines = render_listing(&entries, kind);
    match out {
        Some(path) => {
            let mut body = lines.join("\n");
            if !body.is_empty() {
                body.push('\n');
            }
            fs::write(path, body).with_context(|| format!("Failed to write {}", path))?;
            log::info!("wrote {} {} line(s) to {}", lines.len(), kind, path);
        }
        None => {
            for line in &lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
