use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::analysis::{CrossVersionResolver, NidStatus, VersionStep};
use crate::model::{Corpus, FirmwareVersion, LibraryHistory};
use crate::nid::NidError;

/// `resolved` out of `total` NIDs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub resolved: usize,
    pub total: usize,
}

impl Coverage {
    pub fn percent(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.resolved as f64 / self.total as f64 * 100.0)
        }
    }

    fn add(&mut self, other: Coverage) {
        self.resolved += other.resolved;
        self.total += other.total;
    }
}

impl std::fmt::Display for Coverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.percent() {
            Some(pct) => write!(f, "{:.1}% ({}/{})", pct, self.resolved, self.total),
            None => f.write_str("-"),
        }
    }
}

/// Resolution progress, tracked separately for the two eras.
///
/// Verifiable coverage counts NIDs confirmed by hash in a non-randomized
/// version. Attributed coverage counts NIDs given a name in a randomized
/// version; those names cannot be verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryCoverage {
    pub verifiable: Coverage,
    pub attributed: Coverage,
}

/// Status and name of one NID at one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NidVersionStatus {
    pub status: NidStatus,
    pub name: String,
}

/// Full result for one library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryReport {
    pub library: String,
    pub module: String,
    pub steps: Vec<VersionStep>,
    pub coverage: LibraryCoverage,
    /// Per NID, its status at every version it appears in.
    pub nid_history: BTreeMap<String, BTreeMap<FirmwareVersion, NidVersionStatus>>,
}

impl LibraryReport {
    pub fn step(&self, version: &str) -> Option<&VersionStep> {
        self.steps.iter().find(|s| s.version.as_str() == version)
    }

    /// True if any transition of the library was flagged as a randomization.
    pub fn ever_randomized(&self) -> bool {
        self.steps.iter().any(|s| s.randomized)
    }

    /// NIDs ordered by the first version they appear in, then by name.
    pub fn ordered_nids(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut ordered = Vec::new();
        for step in &self.steps {
            let mut batch: Vec<(&str, &str)> = step
                .result
                .iter()
                .map(|(_, e)| (e.name.as_str(), e.nid.as_str()))
                .filter(|(_, nid)| !seen.contains(nid))
                .collect();
            batch.sort();
            for (_, nid) in batch {
                if seen.insert(nid) {
                    ordered.push(nid);
                }
            }
        }
        ordered
    }
}

/// Results for a whole corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusReport {
    pub generated_at: String,
    /// Every version seen in the corpus, in chronological order.
    pub versions: Vec<FirmwareVersion>,
    /// Sorted by module, then library.
    pub libraries: Vec<LibraryReport>,
    pub totals: LibraryCoverage,
}

impl CorpusReport {
    pub fn library(&self, name: &str) -> Option<&LibraryReport> {
        self.libraries.iter().find(|l| l.library == name)
    }
}

/// Runs the resolver over every library and tallies coverage.
#[derive(Debug, Clone, Default)]
pub struct LibraryAggregator {
    pub resolver: CrossVersionResolver,
}

impl LibraryAggregator {
    pub fn new(resolver: CrossVersionResolver) -> Self {
        Self { resolver }
    }

    pub fn analyze_library(&self, history: &LibraryHistory) -> Result<LibraryReport, NidError> {
        let steps = self.resolver.resolve(history)?;

        let mut nid_history: BTreeMap<String, BTreeMap<FirmwareVersion, NidVersionStatus>> =
            BTreeMap::new();
        let mut verifiable_seen = BTreeSet::new();
        let mut verifiable_known = BTreeSet::new();
        let mut obfuscated_seen = BTreeSet::new();
        let mut attributed = BTreeSet::new();

        for step in &steps {
            let obfuscated = step.is_obfuscated_era();
            for (status, entry) in step.result.iter() {
                nid_history.entry(entry.nid.clone()).or_default().insert(
                    step.version.clone(),
                    NidVersionStatus { status, name: entry.name.clone() },
                );

                if obfuscated {
                    obfuscated_seen.insert(entry.nid.as_str());
                    if status.is_attributed() {
                        attributed.insert(entry.nid.as_str());
                    }
                } else {
                    verifiable_seen.insert(entry.nid.as_str());
                    if status == NidStatus::Known {
                        verifiable_known.insert(entry.nid.as_str());
                    }
                }
            }
        }

        let coverage = LibraryCoverage {
            verifiable: Coverage { resolved: verifiable_known.len(), total: verifiable_seen.len() },
            attributed: Coverage { resolved: attributed.len(), total: obfuscated_seen.len() },
        };

        Ok(LibraryReport {
            library: history.library.clone(),
            module: history.module.clone(),
            steps,
            coverage,
            nid_history,
        })
    }

    /// Analyze every library. Libraries are independent; order only affects
    /// the order of the returned reports.
    pub fn analyze(&self, corpus: &Corpus) -> Result<CorpusReport, NidError> {
        let mut libraries = Vec::with_capacity(corpus.len());
        let mut totals = LibraryCoverage::default();

        for history in corpus.libraries.values() {
            let report = self.analyze_library(history)?;
            totals.verifiable.add(report.coverage.verifiable);
            totals.attributed.add(report.coverage.attributed);
            libraries.push(report);
        }
        libraries.sort_by(|a, b| a.module.cmp(&b.module).then(a.library.cmp(&b.library)));
        log::info!("analyzed {} libraries", libraries.len());

        Ok(CorpusReport {
            generated_at: Utc::now().to_rfc3339(),
            versions: corpus.versions(),
            libraries,
            totals,
        })
    }
}
