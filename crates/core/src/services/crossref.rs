//! Cross-library name recovery.
//!
//! A NID exported under one library with a verified name may appear elsewhere
//! (another library, module, or firmware release) with a placeholder or wrong
//! name. This pass finds those records and proposes the verified name.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::NidEntry;
use crate::nid::{name_matches_nid, NidError};

/// Where a verified name was observed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfirmedName {
    pub name: String,
    pub module: String,
    pub library: String,
}

/// Proposed rename for a record whose name does not hash to its NID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenameSuggestion {
    pub module: String,
    pub library: String,
    pub nid: String,
    pub current_name: String,
    pub suggested_name: String,
    pub source_module: String,
    pub source_library: String,
}

/// A NID for which more than one distinct name hashes correctly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NidCollision {
    pub nid: String,
    pub module: String,
    pub library: String,
    pub candidates: Vec<ConfirmedName>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossrefReport {
    pub suggestions: Vec<RenameSuggestion>,
    pub collisions: Vec<NidCollision>,
}

/// Scan all records and match unresolved NIDs against verified names.
pub fn find_missing_known_nids(entries: &[NidEntry]) -> Result<CrossrefReport, NidError> {
    let mut confirmed: BTreeMap<&str, BTreeSet<ConfirmedName>> = BTreeMap::new();
    let mut unresolved = Vec::new();

    for entry in entries {
        if name_matches_nid(&entry.name, &entry.nid)? {
            confirmed.entry(entry.nid.as_str()).or_default().insert(ConfirmedName {
                name: entry.name.clone(),
                module: entry.module.clone(),
                library: entry.library.clone(),
            });
        } else {
            unresolved.push(entry);
        }
    }

    let mut suggestions = BTreeSet::new();
    let mut collisions = BTreeSet::new();
    for entry in unresolved {
        let Some(candidates) = confirmed.get(entry.nid.as_str()) else {
            continue;
        };
        let distinct: BTreeSet<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        if distinct.len() > 1 {
            log::warn!(
                "collision in NIDs? {} {} {} {:?}",
                entry.nid,
                entry.module,
                entry.library,
                distinct
            );
            collisions.insert(NidCollision {
                nid: entry.nid.clone(),
                module: entry.module.clone(),
                library: entry.library.clone(),
                candidates: candidates.iter().cloned().collect(),
            });
        } else if let Some(source) = candidates.iter().next() {
            suggestions.insert(RenameSuggestion {
                module: entry.module.clone(),
                library: entry.library.clone(),
                nid: entry.nid.clone(),
                current_name: entry.name.clone(),
                suggested_name: source.name.clone(),
                source_module: source.module.clone(),
                source_library: source.library.clone(),
            });
        }
    }

    Ok(CrossrefReport {
        suggestions: suggestions.into_iter().collect(),
        collisions: collisions.into_iter().collect(),
    })
}
