use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::FirmwareVersion;

/// Where a NID was last seen: the version and the name it carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sighting {
    pub version: FirmwareVersion,
    pub name: String,
}

impl Sighting {
    pub fn new(version: FirmwareVersion, name: impl Into<String>) -> Self {
        Self { version, name: name.into() }
    }
}

/// Cross-version memory for one library.
///
/// Both maps only ever grow or overwrite; nothing is removed while the
/// library's version sequence is being processed.
#[derive(Debug, Clone, Default)]
pub struct ResolverState {
    prev_nonobf: HashMap<String, Sighting>,
    prev_ok: HashMap<String, Sighting>,
}

impl ResolverState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last name seen for `nid` in a verifiable version.
    pub fn prev_nonobf(&self, nid: &str) -> Option<&Sighting> {
        self.prev_nonobf.get(nid)
    }

    /// Last hash-confirmed name for `nid`.
    pub fn prev_ok(&self, nid: &str) -> Option<&Sighting> {
        self.prev_ok.get(nid)
    }

    /// True if `name` was confirmed for any NID so far.
    pub fn name_confirmed_anywhere(&self, name: &str) -> bool {
        self.prev_ok.values().any(|sighting| sighting.name == name)
    }

    pub fn record_nonobf(&mut self, nid: &str, version: &FirmwareVersion, name: &str) {
        self.prev_nonobf.insert(nid.to_string(), Sighting::new(version.clone(), name));
    }

    pub fn record_ok(&mut self, nid: &str, version: &FirmwareVersion, name: &str) {
        self.prev_ok.insert(nid.to_string(), Sighting::new(version.clone(), name));
    }

    pub fn confirmed_count(&self) -> usize {
        self.prev_ok.len()
    }

    pub fn nonobf_count(&self) -> usize {
        self.prev_nonobf.len()
    }
}

/// Randomization state of a library.
///
/// Starts `Verifiable`; the first randomized transition moves it to
/// `Obfuscated`, which is terminal for the rest of the sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObfuscationState {
    #[default]
    Verifiable,
    Obfuscated,
}

impl ObfuscationState {
    /// Feed one transition verdict; returns the resulting state.
    pub fn observe(&mut self, randomized: bool) -> ObfuscationState {
        if randomized {
            *self = ObfuscationState::Obfuscated;
        }
        *self
    }

    pub fn is_obfuscated(self) -> bool {
        self == ObfuscationState::Obfuscated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obfuscated_state_never_reverts() {
        let mut state = ObfuscationState::default();
        assert_eq!(state.observe(false), ObfuscationState::Verifiable);
        assert_eq!(state.observe(true), ObfuscationState::Obfuscated);
        assert_eq!(state.observe(false), ObfuscationState::Obfuscated);
    }

    #[test]
    fn record_ok_overwrites_with_newer_name() {
        let mut state = ResolverState::new();
        state.record_ok("AAAAAAAA", &FirmwareVersion::new("1.00"), "old");
        state.record_ok("AAAAAAAA", &FirmwareVersion::new("2.00"), "new");
        let sighting = state.prev_ok("AAAAAAAA").expect("kept");
        assert_eq!(sighting.name, "new");
        assert_eq!(sighting.version.as_str(), "2.00");
        assert!(state.name_confirmed_anywhere("new"));
        assert!(!state.name_confirmed_anywhere("old"));
    }
}
