use nidscope_core::nid::{compute_nid, name_matches_nid, NidError};
use nidscope_core::version;

#[test]
fn version_is_non_empty() {
    let v = version();
    assert!(!v.is_empty());
}

#[test]
fn compute_nid_matches_known_firmware_nids() {
    assert_eq!(compute_nid("sceKernelCreateThread").unwrap(), "446D8DE6");
    assert_eq!(compute_nid("sceKernelStartThread").unwrap(), "F475845D");
    assert_eq!(compute_nid("sceIoOpen").unwrap(), "109F50BC");
    assert_eq!(compute_nid("sceDisplaySetMode").unwrap(), "0E20F177");
}

#[test]
fn compute_nid_is_deterministic_and_uppercase() {
    let first = compute_nid("sceKernelDelayThread").unwrap();
    for _ in 0..10 {
        assert_eq!(compute_nid("sceKernelDelayThread").unwrap(), first);
    }
    assert_eq!(first.len(), 8);
    assert!(first.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    assert!(!first.starts_with("0x"));
}

#[test]
fn empty_name_still_hashes() {
    assert_eq!(compute_nid("").unwrap(), "EEA339DA");
}

#[test]
fn non_ascii_name_is_rejected() {
    let err = compute_nid("sceKernelCréateThread").unwrap_err();
    assert_eq!(err, NidError::NonAsciiName { name: "sceKernelCréateThread".into() });
}

#[test]
fn name_matches_nid_compares_literal_form() {
    assert!(name_matches_nid("sceIoClose", "810C4BC3").unwrap());
    assert!(!name_matches_nid("sceIoClose", "810c4bc3").unwrap());
}
