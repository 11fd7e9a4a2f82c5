use anyhow::{Context, Result};
use nidscope_core::db::ProjectContext;
use nidscope_core::nid::format_nid;
use nidscope_core::services::find_missing_known_nids;

use crate::canonicalize_or_current;

/// Suggest verified names for NIDs left unresolved elsewhere in the corpus.
pub fn crossref_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let entries = ctx.db.load_entries(None).context("Failed to load NID records")?;
    let report = find_missing_known_nids(&entries).context("Failed to cross-reference NIDs")?;

    if json {
        let serialized = serde_json::to_string_pretty(&report)
            .context("Failed to serialize cross-reference report to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Rename suggestions ({}):", report.suggestions.len());
    if report.suggestions.is_empty() {
        println!("  (none)");
    }
    for s in &report.suggestions {
        println!(
            "  - [{}.{} / {}.{}] {}: {} -> {}",
            s.module,
            s.library,
            s.source_module,
            s.source_library,
            format_nid(&s.nid),
            s.current_name,
            s.suggested_name
        );
    }

    if !report.collisions.is_empty() {
        println!("Collisions ({}):", report.collisions.len());
        for c in &report.collisions {
            let names: Vec<&str> = c.candidates.iter().map(|n| n.name.as_str()).collect();
            println!(
                "  - [{}.{}] {}: {}",
                c.module,
                c.library,
                format_nid(&c.nid),
                names.join(", ")
            );
        }
    }

    Ok(())
}
