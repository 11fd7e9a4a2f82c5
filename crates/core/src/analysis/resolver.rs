use serde::{Deserialize, Serialize};

use crate::analysis::{
    ClassificationResult, Classifier, ObfuscationDetector, ObfuscationState, ResolverState,
    TransitionVerdict,
};
use crate::model::{FirmwareVersion, LibraryHistory};
use crate::nid::NidError;

/// Classification of one version of a library, in sequence order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionStep {
    pub version: FirmwareVersion,
    pub result: ClassificationResult,
    /// True when the transition into this version was detected as a
    /// (re-)randomization. Always false for the first version.
    pub randomized: bool,
    /// Detector verdict for the transition into this version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionVerdict>,
}

impl VersionStep {
    /// Whether this version was classified through the obfuscated branch.
    pub fn is_obfuscated_era(&self) -> bool {
        self.result.era.is_obfuscated()
    }
}

/// Drives the detector and classifier over one library's versions.
///
/// State is created per call and dropped when the sequence is exhausted, so
/// nothing leaks between libraries.
#[derive(Debug, Clone, Default)]
pub struct CrossVersionResolver {
    pub detector: ObfuscationDetector,
}

impl CrossVersionResolver {
    pub fn new(detector: ObfuscationDetector) -> Self {
        Self { detector }
    }

    pub fn resolve(&self, history: &LibraryHistory) -> Result<Vec<VersionStep>, NidError> {
        let classifier = Classifier::new(&history.module, &history.library);
        let mut state = ResolverState::new();
        let mut obfuscation = ObfuscationState::Verifiable;
        let mut steps = Vec::with_capacity(history.snapshots.len());

        let mut previous = None;
        for (version, snapshot) in &history.snapshots {
            let transition = match previous {
                Some((prev_version, prev_snapshot)) => {
                    Some(self.detector.detect(prev_version, prev_snapshot, version, snapshot)?)
                }
                None => None,
            };
            let randomized = transition.as_ref().is_some_and(|t| t.randomized);
            if randomized && !obfuscation.is_obfuscated() {
                log::info!(
                    "{} {}: NIDs randomized at {}",
                    history.module,
                    history.library,
                    version
                );
            }
            let era = obfuscation.observe(randomized);

            let result = classifier.classify(version, snapshot, era, &mut state)?;
            steps.push(VersionStep { version: version.clone(), result, randomized, transition });
            previous = Some((version, snapshot));
        }

        Ok(steps)
    }
}
