use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::{NidStatus, ObfuscationState, ResolverState};
use crate::model::{FirmwareVersion, LibrarySnapshot};
use crate::nid::{is_placeholder_name, name_matches_nid, NidError};

/// A NID together with the name it carried at the classified version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedNid {
    pub nid: String,
    pub name: String,
}

/// Disjoint partition of one snapshot.
///
/// Every entry of the snapshot lands in exactly one bucket, so bucket sizes
/// always sum to `total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub version: FirmwareVersion,
    pub era: ObfuscationState,
    pub total: usize,
    pub buckets: BTreeMap<NidStatus, Vec<ClassifiedNid>>,
}

impl ClassificationResult {
    fn empty(version: FirmwareVersion, era: ObfuscationState) -> Self {
        let statuses: &[NidStatus] = match era {
            ObfuscationState::Verifiable => &NidStatus::VERIFIABLE,
            ObfuscationState::Obfuscated => &NidStatus::OBFUSCATED,
        };
        let buckets = statuses.iter().map(|status| (*status, Vec::new())).collect();
        Self { version, era, total: 0, buckets }
    }

    fn push(&mut self, status: NidStatus, nid: &str, name: &str) {
        self.buckets
            .entry(status)
            .or_default()
            .push(ClassifiedNid { nid: nid.to_string(), name: name.to_string() });
    }

    /// Number of NIDs in a category (zero for categories outside this era).
    pub fn count(&self, status: NidStatus) -> usize {
        self.buckets.get(&status).map_or(0, Vec::len)
    }

    pub fn entries(&self, status: NidStatus) -> &[ClassifiedNid] {
        self.buckets.get(&status).map_or(&[], Vec::as_slice)
    }

    /// Sum of all bucket sizes; equals `total`.
    pub fn classified(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Status assigned to `nid`, if it is part of this snapshot.
    pub fn status_of(&self, nid: &str) -> Option<NidStatus> {
        self.buckets
            .iter()
            .find(|(_, entries)| entries.iter().any(|e| e.nid == nid))
            .map(|(status, _)| *status)
    }

    /// Iterate `(status, entry)` over every classified NID.
    pub fn iter(&self) -> impl Iterator<Item = (NidStatus, &ClassifiedNid)> {
        self.buckets.iter().flat_map(|(status, entries)| entries.iter().map(move |e| (*status, e)))
    }
}

/// Per-version classifier for one library.
///
/// The library and module names only label diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    pub module: &'a str,
    pub library: &'a str,
}

impl<'a> Classifier<'a> {
    pub fn new(module: &'a str, library: &'a str) -> Self {
        Self { module, library }
    }

    /// Partition `snapshot` and update `state` with what this version confirms.
    pub fn classify(
        &self,
        version: &FirmwareVersion,
        snapshot: &LibrarySnapshot,
        era: ObfuscationState,
        state: &mut ResolverState,
    ) -> Result<ClassificationResult, NidError> {
        let mut result = ClassificationResult::empty(version.clone(), era);
        result.total = snapshot.len();

        for (nid, name) in snapshot.iter() {
            let status = match era {
                ObfuscationState::Verifiable => self.verifiable_status(version, nid, name, state)?,
                ObfuscationState::Obfuscated => self.obfuscated_status(version, nid, name, state)?,
            };
            result.push(status, nid, name);
        }

        // Confirmed names only become visible to later versions.
        for entry in result.entries(NidStatus::Known) {
            state.record_ok(&entry.nid, version, &entry.name);
        }

        debug_assert_eq!(result.classified(), result.total);
        Ok(result)
    }

    fn verifiable_status(
        &self,
        version: &FirmwareVersion,
        nid: &str,
        name: &str,
        state: &mut ResolverState,
    ) -> Result<NidStatus, NidError> {
        state.record_nonobf(nid, version, name);

        let status = if is_placeholder_name(name, nid) {
            NidStatus::Unknown
        } else if name_matches_nid(name, nid)? {
            NidStatus::Known
        } else {
            NidStatus::Wrong
        };

        if status != NidStatus::Known {
            if let Some(previous) = state.prev_ok(nid) {
                log::warn!(
                    "previously seen OK: {} {} {} {} {} (confirmed as '{}' in {})",
                    self.module,
                    self.library,
                    version,
                    nid,
                    name,
                    previous.name,
                    previous.version
                );
            }
        }
        Ok(status)
    }

    fn obfuscated_status(
        &self,
        version: &FirmwareVersion,
        nid: &str,
        name: &str,
        state: &ResolverState,
    ) -> Result<NidStatus, NidError> {
        if is_placeholder_name(name, nid) {
            if let Some(previous) = state.prev_ok(nid) {
                log::warn!(
                    "previously seen non-obfuscated OK: {} {} {} {} (confirmed as '{}' in {})",
                    self.module,
                    self.library,
                    version,
                    nid,
                    previous.name,
                    previous.version
                );
            }
            return Ok(if state.prev_nonobf(nid).is_some() {
                NidStatus::UnknownNonobf
            } else {
                NidStatus::UnknownObf
            });
        }

        if name_matches_nid(name, nid)? {
            return Ok(NidStatus::Known);
        }

        if let Some(previous) = state.prev_ok(nid).or_else(|| state.prev_nonobf(nid)) {
            log::warn!(
                "previously seen non-obfuscated: {} {} {} {} {} (was '{}' in {})",
                self.module,
                self.library,
                version,
                nid,
                name,
                previous.name,
                previous.version
            );
        }

        Ok(if state.name_confirmed_anywhere(name) {
            NidStatus::NokFromPrevious
        } else {
            NidStatus::NokDubious
        })
    }
}
