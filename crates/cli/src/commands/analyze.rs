use std::collections::BTreeSet;
use std::fs;

use anyhow::{anyhow, Context, Result};
use nidscope_core::analysis::NidStatus;
use nidscope_core::db::ProjectContext;
use nidscope_core::nid::format_nid;
use nidscope_core::services::{CorpusReport, LibraryReport};

use crate::canonicalize_or_current;
use crate::commands::version_cell;

/// Run the resolver over the project's corpus.
fn build_report(ctx: &ProjectContext, library: Option<&str>) -> Result<CorpusReport> {
    let corpus = ctx.db.load_corpus(library).context("Failed to load NID records")?;
    if let Some(name) = library {
        if corpus.is_empty() {
            return Err(anyhow!("Library '{}' has no imported records", name));
        }
    }
    let report = ctx.aggregator().analyze(&corpus).context("Failed to classify NIDs")?;
    Ok(report)
}

/// Classify every library and print coverage per library and version.
pub fn analyze_command(
    root: &str,
    library: Option<String>,
    json: bool,
    write_report: bool,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let report = build_report(&ctx, library.as_deref())?;

    if write_report {
        let path = ctx.layout.status_report_path();
        fs::create_dir_all(&ctx.layout.reports_dir).with_context(|| {
            format!("Failed to create reports dir: {}", ctx.layout.reports_dir.display())
        })?;
        let serialized = serde_json::to_string_pretty(&report)
            .context("Failed to serialize report to JSON")?;
        fs::write(&path, serialized)
            .with_context(|| format!("Failed to write report at {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }

    if json {
        let serialized = serde_json::to_string_pretty(&report)
            .context("Failed to serialize report to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Libraries ({}):", report.libraries.len());
    if report.libraries.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for lib in &report.libraries {
        print_library_summary(lib);
    }
    println!();
    println!("Verifiable NIDs resolved: {}", report.totals.verifiable);
    println!("Randomized NIDs attributed: {}", report.totals.attributed);
    if write_report {
        println!("Report: {}", ctx.layout.status_report_path().display());
    }

    Ok(())
}

fn print_library_summary(lib: &LibraryReport) {
    let mut progress = vec![lib.coverage.verifiable.to_string()];
    if lib.coverage.attributed.total > 0 {
        progress.push(lib.coverage.attributed.to_string());
    }
    println!("  - {} [{}] {}", lib.library, lib.module, progress.join(" / "));
    for step in &lib.steps {
        println!("      {}: {}", step.version, version_cell(step));
    }
}

/// Print the status of every NID of one library at every version.
pub fn show_library_command(root: &str, name: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let report = build_report(&ctx, Some(name))?;
    let lib = report
        .library(name)
        .ok_or_else(|| anyhow!("Library '{}' has no imported records", name))?;

    if json {
        let serialized =
            serde_json::to_string_pretty(lib).context("Failed to serialize library to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("{}: {}", lib.module, lib.library);
    println!("Verifiable: {}", lib.coverage.verifiable);
    if lib.coverage.attributed.total > 0 {
        println!("Attributed: {}", lib.coverage.attributed);
    }
    for nid in lib.ordered_nids() {
        println!("{}", format_nid(nid));
        let Some(history) = lib.nid_history.get(nid) else {
            continue;
        };
        // "..." when the name is unchanged from the previous listed version.
        let mut last_name: Option<&str> = None;
        for (version, seen) in history {
            let shown =
                if last_name == Some(seen.name.as_str()) { "..." } else { seen.name.as_str() };
            println!("    {:<8} {:<18} {}", version.as_str(), seen.status.as_str(), shown);
            last_name = Some(seen.name.as_str());
        }
    }

    let used: BTreeSet<NidStatus> =
        lib.nid_history.values().flat_map(|h| h.values().map(|s| s.status)).collect();
    if !used.is_empty() {
        println!();
        println!("Legend:");
        for status in used {
            println!("  {:<18} {} ({})", status.as_str(), status.description(), status.color());
        }
    }

    Ok(())
}

/// List imported libraries with their version and record counts.
pub fn list_libraries_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let libraries = ctx.db.list_libraries().context("Failed to list libraries")?;

    if json {
        let serialized = serde_json::to_string_pretty(&libraries)
            .context("Failed to serialize libraries to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Libraries ({}):", libraries.len());
    if libraries.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for lib in libraries {
        println!(
            "  - {} [{}] versions={} records={}",
            lib.library, lib.module, lib.versions, lib.entries
        );
    }
    Ok(())
}
