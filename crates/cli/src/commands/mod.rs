pub mod analyze;
pub mod crossref;
pub mod dump;
pub mod hash;
pub mod import;
pub mod project;
pub mod util;

pub use analyze::*;
pub use crossref::*;
pub use dump::*;
pub use hash::*;
pub use import::*;
pub use project::*;
pub use util::*;
