//! Core data model: NID records, firmware versions, per-version snapshots and
//! the corpus grouping consumed by the resolver.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One exported function as recorded by a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NidEntry {
    /// Eight uppercase hex digits, no prefix.
    pub nid: String,
    pub name: String,
    pub library: String,
    /// Owning module (PRX file).
    pub module: String,
    pub version: String,
}

impl NidEntry {
    pub fn new(
        nid: impl Into<String>,
        name: impl Into<String>,
        library: impl Into<String>,
        module: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            nid: nid.into(),
            name: name.into(),
            library: library.into(),
            module: module.into(),
            version: version.into(),
        }
    }
}

/// Firmware release token ordered by release chronology.
///
/// Tokens are compared by their dot-separated numeric components first
/// (`"1.50" < "5.55" < "6.60"`), then by the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FirmwareVersion {
    raw: String,
    parts: Vec<u32>,
}

impl FirmwareVersion {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parts = raw
            .split('.')
            .map_while(|part| {
                let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse::<u32>().ok()
            })
            .collect();
        Self { raw, parts }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for FirmwareVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts).then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for FirmwareVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<String> for FirmwareVersion {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for FirmwareVersion {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<FirmwareVersion> for String {
    fn from(version: FirmwareVersion) -> Self {
        version.raw
    }
}

/// The (NID, name) pairs of one library at one firmware version.
///
/// Entries are keyed by NID, so a snapshot never holds the same NID twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    entries: BTreeMap<String, String>,
}

impl LibrarySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair, returning the name it replaced if the NID was already present.
    pub fn insert(&mut self, nid: impl Into<String>, name: impl Into<String>) -> Option<String> {
        self.entries.insert(nid.into(), name.into())
    }

    pub fn name_of(&self, nid: &str) -> Option<&str> {
        self.entries.get(nid).map(String::as_str)
    }

    pub fn contains(&self, nid: &str) -> bool {
        self.entries.contains_key(nid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(nid, name)` pairs in NID order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(nid, name)| (nid.as_str(), name.as_str()))
    }

    pub fn nids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<N: Into<String>, S: Into<String>> FromIterator<(N, S)> for LibrarySnapshot {
    fn from_iter<I: IntoIterator<Item = (N, S)>>(iter: I) -> Self {
        let mut snapshot = LibrarySnapshot::new();
        for (nid, name) in iter {
            snapshot.insert(nid, name);
        }
        snapshot
    }
}

/// Every recorded version of one library, in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryHistory {
    pub library: String,
    /// Module owning the library at its newest recorded version.
    pub module: String,
    pub snapshots: BTreeMap<FirmwareVersion, LibrarySnapshot>,
}

impl LibraryHistory {
    pub fn new(library: impl Into<String>, module: impl Into<String>) -> Self {
        Self { library: library.into(), module: module.into(), snapshots: BTreeMap::new() }
    }

    /// Builder-style helper used mostly by tests and in-memory callers.
    pub fn with_snapshot(
        mut self,
        version: impl Into<FirmwareVersion>,
        snapshot: LibrarySnapshot,
    ) -> Self {
        self.snapshots.insert(version.into(), snapshot);
        self
    }
}

/// All libraries known to a project, keyed by library name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    pub libraries: BTreeMap<String, LibraryHistory>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group flat records by library and version.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a NidEntry>) -> Self {
        let mut corpus = Corpus::new();
        for entry in entries {
            corpus.add_entry(entry);
        }
        corpus
    }

    pub fn add_entry(&mut self, entry: &NidEntry) {
        let version = FirmwareVersion::new(entry.version.as_str());
        let history = self
            .libraries
            .entry(entry.library.clone())
            .or_insert_with(|| LibraryHistory::new(&entry.library, &entry.module));

        let newest = history.snapshots.keys().next_back();
        if newest.map_or(true, |newest| &version >= newest) {
            history.module = entry.module.clone();
        }

        let snapshot = history.snapshots.entry(version).or_default();
        if let Some(previous) = snapshot.insert(&entry.nid, &entry.name) {
            if previous != entry.name {
                log::debug!(
                    "duplicate NID {} in {} at {}: '{}' replaced by '{}'",
                    entry.nid,
                    entry.library,
                    entry.version,
                    previous,
                    entry.name
                );
            }
        }
    }

    pub fn insert_library(&mut self, history: LibraryHistory) {
        self.libraries.insert(history.library.clone(), history);
    }

    pub fn get(&self, library: &str) -> Option<&LibraryHistory> {
        self.libraries.get(library)
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Every version seen across all libraries, in chronological order.
    pub fn versions(&self) -> Vec<FirmwareVersion> {
        let mut versions: Vec<FirmwareVersion> =
            self.libraries.values().flat_map(|h| h.snapshots.keys().cloned()).collect();
        versions.sort();
        versions.dedup();
        versions
    }
}
