use std::fs;

use crate::{canonicalize_or_current, infer_project_name};
use anyhow::{Context, Result};
use nidscope_core::analysis::DetectorSettings;
use nidscope_core::db::{EntryDb, ProjectConfig, ProjectContext, ProjectLayout};
use serde::Serialize;

#[derive(Serialize)]
pub struct ProjectInfoSnapshot {
    pub name: String,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub db_path: String,
    pub schema_version: i32,
    pub reports_dir: String,
    pub detector: DetectorSettings,
    pub sources: usize,
    pub libraries: usize,
    pub entries: usize,
}

/// Initialize a new project at `root`.
pub fn init_project_command(root: &str, name: Option<String>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    // Derive project name if not provided.
    let project_name = match name {
        Some(n) => n,
        None => infer_project_name(&root_path),
    };

    // Ensure directories exist.
    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    fs::create_dir_all(&layout.reports_dir).with_context(|| {
        format!("Failed to create reports dir: {}", layout.reports_dir.display())
    })?;

    // Build project config.
    let db_path_rel = layout.db_path_relative_string();
    let config = ProjectConfig::new(&project_name, db_path_rel);
    config.write_to(&layout.project_config_path)?;

    // Create the project database immediately so follow-on commands (and tests)
    // can rely on its presence.
    EntryDb::open(&layout.db_path).with_context(|| {
        format!("Failed to initialize project database at {}", layout.db_path.display())
    })?;

    println!("Initialized nidscope project:");
    println!("  Name: {}", project_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.project_config_path.display());
    println!("  DB path (relative): {}", config.db.path);
    println!("  Reports dir: {}", layout.reports_dir.display());

    Ok(())
}

/// Show basic information about an existing project.
pub fn project_info_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ProjectContext { layout, config, db, .. } = ProjectContext::from_root(&root_path)?;

    let schema_version = db.schema_version().context("Failed to read schema version")?;
    let sources = db.list_sources().context("Failed to list sources")?;
    let libraries = db.list_libraries().context("Failed to list libraries")?;
    let entries = db.count_entries().context("Failed to count entries")?;

    if json {
        let snapshot = ProjectInfoSnapshot {
            name: config.name.clone(),
            root: layout.root.display().to_string(),
            config_file: layout.project_config_path.display().to_string(),
            config_version: config.config_version.clone(),
            db_path: config.db.path.clone(),
            schema_version,
            reports_dir: layout.reports_dir.display().to_string(),
            detector: config.detector.clone(),
            sources: sources.len(),
            libraries: libraries.len(),
            entries,
        };
        let serialized = serde_json::to_string_pretty(&snapshot)?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("nidscope Project Info");
    println!("=====================");
    println!("Name: {}", config.name);
    println!("Root: {}", layout.root.display());
    println!("Config file: {}", layout.project_config_path.display());
    println!("Config version: {}", config.config_version);
    println!("DB path (config): {}", config.db.path);
    println!("Schema version: {}", schema_version);
    println!();

    println!("Directories:");
    crate::commands::print_dir_status("Meta dir (.nidscope)", &layout.meta_dir);
    crate::commands::print_dir_status("Reports dir", &layout.reports_dir);
    println!();

    println!("Detector:");
    println!("  New NID ratio threshold: {}", config.detector.new_ratio_threshold);
    println!("  Disappeared NID ratio threshold: {}", config.detector.disappeared_ratio_threshold);
    if config.detector.exceptions.is_empty() {
        println!("  Exceptions: (none)");
    } else {
        println!("  Exceptions:");
        for exception in &config.detector.exceptions {
            println!("    - {}: {}", exception.version, exception.reason);
        }
    }
    println!();

    println!("Sources imported: {}", sources.len());
    println!("Libraries: {}", libraries.len());
    println!("NID records: {}", entries);

    Ok(())
}
