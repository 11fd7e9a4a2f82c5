//! NID classification and randomization tracking.
//!
//! This module holds the per-library pipeline:
//! - `detector`: decides whether a version transition re-randomized a library.
//! - `classifier`: partitions one version's NIDs into status categories.
//! - `resolver`: walks a library's versions in order, threading the
//!   cross-version state between the two.

pub mod classifier;
pub mod detector;
pub mod resolver;
mod state;
mod status;

pub use classifier::{ClassificationResult, ClassifiedNid, Classifier};
pub use detector::{
    DetectorException, DetectorSettings, ExceptionTable, ObfuscationDetector, TransitionVerdict,
    DEFAULT_CHURN_THRESHOLD,
};
pub use resolver::{CrossVersionResolver, VersionStep};
pub use state::{ObfuscationState, ResolverState, Sighting};
pub use status::NidStatus;
