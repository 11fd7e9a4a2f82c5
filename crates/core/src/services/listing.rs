//! Plain-text listings of imported records, one item per line.

use std::fmt;
use std::str::FromStr;

use crate::model::NidEntry;
use crate::nid::format_nid;

/// What a listing contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    /// Every NID.
    Nids,
    /// NIDs whose name is a placeholder.
    UnknownNids,
    /// Every function name.
    Names,
    /// Names that are not placeholders.
    KnownNames,
}

impl ListingKind {
    pub const ALL: [ListingKind; 4] =
        [ListingKind::Nids, ListingKind::UnknownNids, ListingKind::Names, ListingKind::KnownNames];

    pub fn as_str(self) -> &'static str {
        match self {
            ListingKind::Nids => "nids",
            ListingKind::UnknownNids => "unknown-nids",
            ListingKind::Names => "names",
            ListingKind::KnownNames => "known-names",
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ListingKind::ALL.into_iter().find(|kind| kind.as_str() == s).ok_or_else(|| {
            let known: Vec<&str> = ListingKind::ALL.iter().map(|k| k.as_str()).collect();
            format!("unknown listing '{s}' (expected one of: {})", known.join(", "))
        })
    }
}

/// Placeholder test for listings; unlike classification, the NID suffix is
/// matched ignoring case.
fn looks_unnamed(entry: &NidEntry) -> bool {
    entry.name.to_ascii_uppercase().ends_with(&entry.nid)
}

/// Render `entries` in input order. NIDs are `0x`-prefixed.
pub fn render_listing(entries: &[NidEntry], kind: ListingKind) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| match kind {
            ListingKind::Nids => Some(format_nid(&entry.nid)),
            ListingKind::UnknownNids => looks_unnamed(entry).then(|| format_nid(&entry.nid)),
            ListingKind::Names => Some(entry.name.clone()),
            ListingKind::KnownNames => (!looks_unnamed(entry)).then(|| entry.name.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<NidEntry> {
        vec![
            NidEntry::new("109F50BC", "sceIoOpen", "Lib", "m", "1.00"),
            NidEntry::new("810C4BC3", "Lib_810c4bc3", "Lib", "m", "1.00"),
            NidEntry::new("6A638D83", "Lib_6A638D83", "Lib", "m", "1.00"),
        ]
    }

    #[test]
    fn unknown_nids_match_suffix_in_any_case() {
        let lines = render_listing(&entries(), ListingKind::UnknownNids);
        assert_eq!(lines, vec!["0x810C4BC3", "0x6A638D83"]);
    }

    #[test]
    fn known_names_exclude_placeholders() {
        assert_eq!(render_listing(&entries(), ListingKind::KnownNames), vec!["sceIoOpen"]);
        assert_eq!(render_listing(&entries(), ListingKind::Names).len(), 3);
        assert_eq!(render_listing(&entries(), ListingKind::Nids)[0], "0x109F50BC");
    }

    #[test]
    fn kinds_parse_from_their_names() {
        for kind in ListingKind::ALL {
            assert_eq!(kind.as_str().parse::<ListingKind>(), Ok(kind));
        }
        assert!("everything".parse::<ListingKind>().is_err());
    }
}
