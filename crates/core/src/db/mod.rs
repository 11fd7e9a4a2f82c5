//! Project storage: on-disk layout, configuration, and the SQLite entry store.
//!
//! - `ProjectLayout`: computed paths for project directories/files.
//! - `ProjectConfig`: serializable project metadata and detector settings.
//! - `EntryDb`: SQLite store of imported NID records, grouped into a `Corpus`
//!   on demand.
//! - `ProjectContext`: layout + config + open database.

mod config;
mod context;
mod entry_db;
mod layout;
mod models;

pub use config::*;
pub use context::*;
pub use entry_db::*;
pub use layout::*;
pub use models::*;
