//! Randomization detection between two adjacent versions of a library.
//!
//! The heuristic flags a transition when both a large share of the newer
//! version's NIDs are new and a large share of the older version's NIDs
//! disappeared. A single newly-appearing NID whose name still hashes
//! correctly vetoes the verdict, unless the older version is listed in the
//! exception table. A library randomized since its first recorded version is
//! never detected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{FirmwareVersion, LibrarySnapshot};
use crate::nid::{name_matches_nid, NidError};

/// Default share of new/disappeared NIDs above which a transition is suspicious.
pub const DEFAULT_CHURN_THRESHOLD: f64 = 0.2;

/// One entry of the exception table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorException {
    /// Older version of the transition this exception applies to.
    pub version: String,
    /// Why the hash veto is suppressed for this release.
    pub reason: String,
}

/// Serializable detector configuration, stored in the project config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorSettings {
    #[serde(default = "default_threshold")]
    pub new_ratio_threshold: f64,
    #[serde(default = "default_threshold")]
    pub disappeared_ratio_threshold: f64,
    #[serde(default = "default_exceptions")]
    pub exceptions: Vec<DetectorException>,
}

fn default_threshold() -> f64 {
    DEFAULT_CHURN_THRESHOLD
}

fn default_exceptions() -> Vec<DetectorException> {
    vec![DetectorException {
        version: "5.55".to_string(),
        reason: "5.55 omits functions present in 5.51 instead of re-randomizing them".to_string(),
    }]
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            new_ratio_threshold: DEFAULT_CHURN_THRESHOLD,
            disappeared_ratio_threshold: DEFAULT_CHURN_THRESHOLD,
            exceptions: default_exceptions(),
        }
    }
}

/// Versions whose outgoing transition ignores the verified-name veto.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionTable {
    entries: BTreeMap<String, String>,
}

impl ExceptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, version: impl Into<String>, reason: impl Into<String>) -> &mut Self {
        self.entries.insert(version.into(), reason.into());
        self
    }

    /// Reason recorded for `version`, if the veto is suppressed for it.
    pub fn reason(&self, version: &FirmwareVersion) -> Option<&str> {
        self.entries.get(version.as_str()).map(String::as_str)
    }

    pub fn suppresses_veto(&self, version: &FirmwareVersion) -> bool {
        self.entries.contains_key(version.as_str())
    }
}

/// Outcome of comparing two adjacent snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionVerdict {
    pub from: FirmwareVersion,
    pub to: FirmwareVersion,
    pub new_nids: usize,
    pub disappeared_nids: usize,
    /// `None` when the newer snapshot is empty.
    pub new_ratio: Option<f64>,
    /// `None` when the older snapshot is empty.
    pub disappeared_ratio: Option<f64>,
    pub churn_exceeded: bool,
    /// First new NID found whose name hashes correctly.
    pub verified_new_nid: Option<String>,
    pub exception_applied: bool,
    pub randomized: bool,
}

/// Churn-based randomization detector.
#[derive(Debug, Clone)]
pub struct ObfuscationDetector {
    pub new_ratio_threshold: f64,
    pub disappeared_ratio_threshold: f64,
    pub exceptions: ExceptionTable,
}

impl Default for ObfuscationDetector {
    fn default() -> Self {
        Self::from_settings(&DetectorSettings::default())
    }
}

impl ObfuscationDetector {
    pub fn from_settings(settings: &DetectorSettings) -> Self {
        let mut exceptions = ExceptionTable::new();
        for exception in &settings.exceptions {
            exceptions.insert(&exception.version, &exception.reason);
        }
        Self {
            new_ratio_threshold: settings.new_ratio_threshold,
            disappeared_ratio_threshold: settings.disappeared_ratio_threshold,
            exceptions,
        }
    }

    /// Decide whether the `older` → `newer` transition re-randomized the library.
    pub fn detect(
        &self,
        from: &FirmwareVersion,
        older: &LibrarySnapshot,
        to: &FirmwareVersion,
        newer: &LibrarySnapshot,
    ) -> Result<TransitionVerdict, NidError> {
        let new_nids: Vec<(&str, &str)> =
            newer.iter().filter(|(nid, _)| !older.contains(nid)).collect();
        let disappeared_nids = older.nids().filter(|nid| !newer.contains(nid)).count();

        let new_ratio = ratio(new_nids.len(), newer.len());
        let disappeared_ratio = ratio(disappeared_nids, older.len());

        // An empty side gives no signal.
        let churn_exceeded = matches!(
            (new_ratio, disappeared_ratio),
            (Some(n), Some(d)) if n > self.new_ratio_threshold && d > self.disappeared_ratio_threshold
        );

        let mut verified_new_nid = None;
        let mut exception_applied = false;
        let mut randomized = churn_exceeded;

        if churn_exceeded {
            for (nid, name) in &new_nids {
                if name_matches_nid(name, nid)? {
                    verified_new_nid = Some(nid.to_string());
                    break;
                }
            }
            if verified_new_nid.is_some() {
                if let Some(reason) = self.exceptions.reason(from) {
                    log::debug!("keeping randomization verdict for {from} -> {to}: {reason}");
                    exception_applied = true;
                } else {
                    randomized = false;
                }
            }
        }

        log::debug!(
            "transition {from} -> {to}: new {}/{} disappeared {}/{} randomized={randomized}",
            new_nids.len(),
            newer.len(),
            disappeared_nids,
            older.len()
        );

        Ok(TransitionVerdict {
            from: from.clone(),
            to: to.clone(),
            new_nids: new_nids.len(),
            disappeared_nids,
            new_ratio,
            disappeared_ratio,
            churn_exceeded,
            verified_new_nid,
            exception_applied,
            randomized,
        })
    }
}

fn ratio(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 / whole as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_carry_the_555_exception() {
        let detector = ObfuscationDetector::default();
        assert!(detector.exceptions.suppresses_veto(&FirmwareVersion::new("5.55")));
        assert!(!detector.exceptions.suppresses_veto(&FirmwareVersion::new("5.51")));
        assert_eq!(detector.new_ratio_threshold, DEFAULT_CHURN_THRESHOLD);
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: DetectorSettings =
            serde_json::from_str(r#"{ "new_ratio_threshold": 0.5 }"#).expect("parse");
        assert_eq!(settings.new_ratio_threshold, 0.5);
        assert_eq!(settings.disappeared_ratio_threshold, DEFAULT_CHURN_THRESHOLD);
        assert_eq!(settings.exceptions.len(), 1);
    }

    #[test]
    fn ratio_guards_empty_denominator() {
        assert_eq!(ratio(0, 0), None);
        assert_eq!(ratio(1, 4), Some(0.25));
    }
}
