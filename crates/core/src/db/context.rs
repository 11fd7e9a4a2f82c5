use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::analysis::{CrossVersionResolver, ObfuscationDetector};
use crate::db::{EntryDb, ProjectConfig, ProjectLayout};
use crate::services::LibraryAggregator;

/// Convenience wrapper bundling layout, config, db path, and an open EntryDb.
#[derive(Debug)]
pub struct ProjectContext {
    pub layout: ProjectLayout,
    pub config: ProjectConfig,
    pub db_path: PathBuf,
    pub db: EntryDb,
}

impl ProjectContext {
    /// Load project config and open the database for a given root.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let layout = ProjectLayout::new(root);
        let config = ProjectConfig::read_from(&layout.project_config_path)?;
        let db_path = layout.resolve_db_path(&config.db.path);
        let db = EntryDb::open(&db_path)
            .with_context(|| format!("Failed to open project database at {}", db_path.display()))?;
        Ok(Self { layout, config, db_path, db })
    }

    /// Aggregator configured with this project's detector settings.
    pub fn aggregator(&self) -> LibraryAggregator {
        let detector = ObfuscationDetector::from_settings(&self.config.detector);
        LibraryAggregator::new(CrossVersionResolver::new(detector))
    }
}
