pub mod aggregate;
pub mod crossref;
pub mod listing;

pub use aggregate::{
    CorpusReport, Coverage, LibraryAggregator, LibraryCoverage, LibraryReport, NidVersionStatus,
};
pub use crossref::{find_missing_known_nids, CrossrefReport, NidCollision, RenameSuggestion};
pub use listing::{render_listing, ListingKind};
