use nidscope_core::analysis::{DetectorSettings, ObfuscationDetector};
use nidscope_core::model::{FirmwareVersion, LibrarySnapshot};

fn snapshot(pairs: &[(&str, &str)]) -> LibrarySnapshot {
    pairs.iter().copied().collect()
}

/// Four NIDs, three of which disappear in `newer()`.
fn older() -> LibrarySnapshot {
    snapshot(&[
        ("446D8DE6", "sceKernelCreateThread"),
        ("F475845D", "sceKernelStartThread"),
        ("AA73C935", "sceKernelExitThread"),
        ("CEADEB47", "sceKernelDelayThread"),
    ])
}

/// Keeps one NID and introduces three new ones; `sceIoOpen` hashes correctly.
fn newer() -> LibrarySnapshot {
    snapshot(&[
        ("446D8DE6", "sceKernelCreateThread"),
        ("109F50BC", "sceIoOpen"),
        ("9A1B2C3D", "sceKernelStartThread"),
        ("0F0E0D0C", "sceKernelExitThread"),
    ])
}

fn detect(from: &str, a: &LibrarySnapshot, to: &str, b: &LibrarySnapshot) -> bool {
    ObfuscationDetector::default()
        .detect(&FirmwareVersion::new(from), a, &FirmwareVersion::new(to), b)
        .expect("detect")
        .randomized
}

#[test]
fn verified_new_name_vetoes_randomization() {
    let verdict = ObfuscationDetector::default()
        .detect(&"5.51".into(), &older(), &"6.00".into(), &newer())
        .expect("detect");

    assert_eq!(verdict.new_nids, 3);
    assert_eq!(verdict.disappeared_nids, 3);
    assert_eq!(verdict.new_ratio, Some(0.75));
    assert_eq!(verdict.disappeared_ratio, Some(0.75));
    assert!(verdict.churn_exceeded);
    assert_eq!(verdict.verified_new_nid.as_deref(), Some("109F50BC"));
    assert!(!verdict.exception_applied);
    assert!(!verdict.randomized);
}

#[test]
fn exception_version_keeps_verdict_despite_verified_name() {
    let verdict = ObfuscationDetector::default()
        .detect(&"5.55".into(), &older(), &"6.00".into(), &newer())
        .expect("detect");

    assert!(verdict.exception_applied);
    assert!(verdict.randomized);
}

#[test]
fn churn_without_verified_names_is_randomization() {
    let newer = snapshot(&[
        ("446D8DE6", "sceKernelCreateThread"),
        ("9A1B2C3D", "sceKernelStartThread"),
        ("0F0E0D0C", "sceKernelExitThread"),
        ("01020304", "Lib_01020304"),
    ]);
    assert!(detect("5.51", &older(), "6.00", &newer));
}

#[test]
fn low_churn_is_not_randomization() {
    let mut newer = older();
    newer.insert("109F50BC", "sceIoOpen");
    assert!(!detect("1.00", &older(), "1.50", &newer));
}

#[test]
fn both_ratios_must_exceed_threshold() {
    // Everything old is kept, many additions: disappeared ratio is zero.
    let mut newer = older();
    for (nid, name) in [("01020304", "a"), ("05060708", "b"), ("090A0B0C", "c"), ("0D0E0F10", "d")] {
        newer.insert(nid, name);
    }
    assert!(!detect("1.00", &older(), "2.00", &newer));
}

#[test]
fn empty_snapshots_give_no_signal() {
    let empty = LibrarySnapshot::new();

    let into_empty = ObfuscationDetector::default()
        .detect(&"1.00".into(), &older(), &"2.00".into(), &empty)
        .expect("detect");
    assert_eq!(into_empty.new_ratio, None);
    assert!(!into_empty.randomized);

    let out_of_empty = ObfuscationDetector::default()
        .detect(&"2.00".into(), &empty, &"3.00".into(), &older())
        .expect("detect");
    assert_eq!(out_of_empty.disappeared_ratio, None);
    assert!(!out_of_empty.randomized);
}

#[test]
fn custom_exception_table_is_honored() {
    let mut settings = DetectorSettings::default();
    settings.exceptions.clear();
    let detector = ObfuscationDetector::from_settings(&settings);
    let verdict =
        detector.detect(&"5.55".into(), &older(), &"6.00".into(), &newer()).expect("detect");
    assert!(!verdict.randomized);

    let mut table = detector.exceptions.clone();
    table.insert("5.51", "test exception");
    let detector = ObfuscationDetector { exceptions: table, ..detector };
    let verdict =
        detector.detect(&"5.51".into(), &older(), &"6.00".into(), &newer()).expect("detect");
    assert!(verdict.randomized);
}

#[test]
fn thresholds_come_from_settings() {
    let settings = DetectorSettings {
        new_ratio_threshold: 0.8,
        disappeared_ratio_threshold: 0.8,
        exceptions: vec![],
    };
    let detector = ObfuscationDetector::from_settings(&settings);
    let newer = snapshot(&[
        ("446D8DE6", "sceKernelCreateThread"),
        ("9A1B2C3D", "x"),
        ("0F0E0D0C", "y"),
        ("01020304", "z"),
    ]);
    let verdict =
        detector.detect(&"1.00".into(), &older(), &"2.00".into(), &newer).expect("detect");
    assert!(!verdict.churn_exceeded);
}
