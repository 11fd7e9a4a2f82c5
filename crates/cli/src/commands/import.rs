use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use nidscope_core::db::{ProjectContext, SourceRecord};
use nidscope_core::libdoc::{load_file, SourceFormat, SourceLabels};

use crate::{canonicalize_or_current, sha256_file};

/// Per-invocation import options shared by every file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions<'a> {
    /// Overrides extension-based format detection.
    pub format: Option<SourceFormat>,
    /// Module for formats that do not name one. Defaults to the file stem.
    pub module: Option<&'a str>,
    /// Library for function lists. Defaults to the file stem.
    pub library: Option<&'a str>,
}

/// Import one source file into the project database.
///
/// Returns `None` when the same content was already imported for `version`.
pub fn import_file(
    ctx: &ProjectContext,
    path: &Path,
    version: &str,
    options: ImportOptions<'_>,
) -> Result<Option<usize>> {
    if !path.is_file() {
        return Err(anyhow!("Source file does not exist: {}", path.display()));
    }
    let format = options.format.or_else(|| SourceFormat::from_path(path)).ok_or_else(|| {
        anyhow!(
            "Unrecognized source format (expected .xml, .exp, .cpp/.h, or --format): {}",
            path.display()
        )
    })?;

    let sha256 = sha256_file(path)?;
    if let Some(existing) = ctx.db.find_source(&sha256, version)? {
        log::info!("skipping {} (already imported from {})", path.display(), existing.path);
        return Ok(None);
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_string();
    let labels = SourceLabels {
        library: options.library.unwrap_or(&stem),
        module: options.module.unwrap_or(&stem),
    };
    let entries = load_file(path, format, version, labels)
        .with_context(|| format!("Failed to load {} as {}", path.display(), format))?;

    let source = SourceRecord {
        path: path.display().to_string(),
        version: version.to_string(),
        sha256,
        imported_at: Utc::now().to_rfc3339(),
    };
    let inserted =
        ctx.db.import_source(&source, &entries).context("Failed to store imported records")?;
    log::info!("imported {} records from {} ({})", inserted, path.display(), version);
    Ok(Some(inserted))
}

/// Import explicit files, all belonging to `version`.
pub fn import_command(
    root: &str,
    version: &str,
    options: ImportOptions<'_>,
    files: &[String],
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;

    let mut imported = 0usize;
    let mut skipped = 0usize;
    let mut records = 0usize;
    for file in files {
        match import_file(&ctx, Path::new(file), version, options)? {
            Some(count) => {
                imported += 1;
                records += count;
            }
            None => skipped += 1,
        }
    }

    println!("Imported {} file(s) for version {} ({} records)", imported, version, records);
    if skipped > 0 {
        println!("Skipped {} already-imported file(s)", skipped);
    }
    Ok(())
}

/// Find libdoc exports laid out as `<dir>/<version>/Export/**/*.xml`.
///
/// Returns `(version, path)` pairs sorted by path.
pub fn discover_export_tree(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();
    for version_entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?
    {
        let version_entry = version_entry?;
        if !version_entry.file_type()?.is_dir() {
            continue;
        }
        let version = version_entry.file_name().to_string_lossy().to_string();
        let export_dir = version_entry.path().join("Export");
        if !export_dir.is_dir() {
            continue;
        }
        let mut files = Vec::new();
        collect_xml_files(&export_dir, &mut files)?;
        found.extend(files.into_iter().map(|path| (version.clone(), path)));
    }
    found.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(found)
}

fn collect_xml_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_xml_files(&path, out)?;
        } else if SourceFormat::from_path(&path) == Some(SourceFormat::Libdoc) {
            out.push(path);
        }
    }
    Ok(())
}

/// Import a whole firmware export tree.
pub fn import_tree_command(root: &str, dir: &str) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;

    let files = discover_export_tree(Path::new(dir))?;
    if files.is_empty() {
        println!("No export files found under {}", dir);
        return Ok(());
    }

    let mut imported = 0usize;
    let mut records = 0usize;
    for (version, path) in &files {
        if let Some(count) = import_file(&ctx, path, version, ImportOptions::default())? {
            imported += 1;
            records += count;
        }
    }

    println!("Imported {}/{} file(s) ({} records)", imported, files.len(), records);
    Ok(())
}
