use serde::{Deserialize, Serialize};

/// Category assigned to one NID at one version.
///
/// `Known`, `Unknown` and `Wrong` apply to versions whose NIDs are still
/// verifiable; `Known` and the remaining variants apply once the library has
/// been randomized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NidStatus {
    /// Name hashes to the NID.
    Known,
    /// Placeholder name in a verifiable version.
    Unknown,
    /// Real name that does not hash to the NID.
    Wrong,
    /// Randomized, but the name was confirmed for some NID earlier.
    NokFromPrevious,
    /// Randomized, name of unknown provenance.
    NokDubious,
    /// Placeholder name for a NID that existed before randomization.
    UnknownNonobf,
    /// Placeholder name for a NID only ever seen randomized.
    UnknownObf,
}

impl NidStatus {
    pub const ALL: [NidStatus; 7] = [
        NidStatus::Known,
        NidStatus::Unknown,
        NidStatus::Wrong,
        NidStatus::NokFromPrevious,
        NidStatus::NokDubious,
        NidStatus::UnknownNonobf,
        NidStatus::UnknownObf,
    ];

    /// Categories produced while the library is verifiable.
    pub const VERIFIABLE: [NidStatus; 3] = [NidStatus::Known, NidStatus::Unknown, NidStatus::Wrong];

    /// Categories produced once the library has been randomized.
    pub const OBFUSCATED: [NidStatus; 5] = [
        NidStatus::Known,
        NidStatus::UnknownNonobf,
        NidStatus::UnknownObf,
        NidStatus::NokFromPrevious,
        NidStatus::NokDubious,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NidStatus::Known => "known",
            NidStatus::Unknown => "unknown",
            NidStatus::Wrong => "wrong",
            NidStatus::NokFromPrevious => "nok_from_previous",
            NidStatus::NokDubious => "nok_dubious",
            NidStatus::UnknownNonobf => "unknown_nonobf",
            NidStatus::UnknownObf => "unknown_obf",
        }
    }

    /// Display colour shared by report renderers.
    pub fn color(self) -> &'static str {
        match self {
            NidStatus::Known => "green",
            NidStatus::Unknown | NidStatus::UnknownNonobf => "orange",
            NidStatus::Wrong => "red",
            NidStatus::NokFromPrevious => "yellow",
            NidStatus::NokDubious => "brown",
            NidStatus::UnknownObf => "grey",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            NidStatus::Known => "matching the name hash",
            NidStatus::Unknown => "unknown",
            NidStatus::Wrong => "not matching the name hash",
            NidStatus::NokFromPrevious => "obfuscated but matching a previous non-obfuscated name",
            NidStatus::NokDubious => "obfuscated but found from an unknown source",
            NidStatus::UnknownNonobf => "unknown and non-obfuscated",
            NidStatus::UnknownObf => "unknown but obfuscated",
        }
    }

    /// Counts toward attributed coverage when seen in a randomized version.
    pub fn is_attributed(self) -> bool {
        matches!(self, NidStatus::Known | NidStatus::NokFromPrevious | NidStatus::NokDubious)
    }
}

impl std::fmt::Display for NidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
