use serde::{Deserialize, Serialize};

/// A source file imported into the project database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceRecord {
    /// Path as given at import time.
    pub path: String,
    /// Firmware version the file's records belong to.
    pub version: String,
    /// SHA-256 of the file contents; used to skip re-imports.
    pub sha256: String,
    /// RFC 3339 timestamp.
    pub imported_at: String,
}

/// Per-library counts over the imported records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibrarySummary {
    pub library: String,
    pub module: String,
    pub versions: usize,
    pub entries: usize,
}
