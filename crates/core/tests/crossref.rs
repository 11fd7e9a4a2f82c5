use nidscope_core::model::NidEntry;
use nidscope_core::services::find_missing_known_nids;

fn entry(nid: &str, name: &str, library: &str, module: &str) -> NidEntry {
    NidEntry::new(nid, name, library, module, "6.60")
}

#[test]
fn verified_name_is_suggested_for_placeholder_elsewhere() {
    let entries = vec![
        entry("109F50BC", "sceIoOpen", "IoFileMgrForUser", "iofilemgr.prx"),
        entry("109F50BC", "IoFileMgrForKernel_109F50BC", "IoFileMgrForKernel", "iofilemgr.prx"),
        entry("810C4BC3", "IoFileMgrForUser_810C4BC3", "IoFileMgrForUser", "iofilemgr.prx"),
    ];
    let report = find_missing_known_nids(&entries).expect("crossref");

    assert!(report.collisions.is_empty());
    assert_eq!(report.suggestions.len(), 1);
    let suggestion = &report.suggestions[0];
    assert_eq!(suggestion.nid, "109F50BC");
    assert_eq!(suggestion.library, "IoFileMgrForKernel");
    assert_eq!(suggestion.current_name, "IoFileMgrForKernel_109F50BC");
    assert_eq!(suggestion.suggested_name, "sceIoOpen");
    assert_eq!(suggestion.source_library, "IoFileMgrForUser");
}

#[test]
fn wrong_names_also_get_suggestions() {
    let entries = vec![
        entry("446D8DE6", "sceKernelCreateThread", "ThreadManForUser", "threadman.prx"),
        entry("446D8DE6", "sceKernelMakeThread", "ThreadManForKernel", "threadman.prx"),
    ];
    let report = find_missing_known_nids(&entries).expect("crossref");
    assert_eq!(report.suggestions.len(), 1);
    assert_eq!(report.suggestions[0].current_name, "sceKernelMakeThread");
}

#[test]
fn fully_resolved_corpus_has_nothing_to_report() {
    let entries = vec![
        entry("109F50BC", "sceIoOpen", "IoFileMgrForUser", "iofilemgr.prx"),
        entry("109F50BC", "sceIoOpen", "IoFileMgrForKernel", "iofilemgr.prx"),
    ];
    let report = find_missing_known_nids(&entries).expect("crossref");
    assert!(report.suggestions.is_empty());
    assert!(report.collisions.is_empty());
}

#[test]
fn non_ascii_name_aborts() {
    let entries = vec![entry("00000000", "sceÄ", "Lib", "m")];
    assert!(find_missing_known_nids(&entries).is_err());
}

#[test]
fn colliding_verified_names_are_reported_instead_of_suggested() {
    // Both names hash to 2AA60DF8.
    let entries = vec![
        entry("2AA60DF8", "sceKernelNid117576", "LibA", "a.prx"),
        entry("2AA60DF8", "sceKernelNid140970", "LibB", "b.prx"),
        entry("2AA60DF8", "LibC_2AA60DF8", "LibC", "c.prx"),
    ];
    let report = find_missing_known_nids(&entries).expect("crossref");

    assert!(report.suggestions.is_empty());
    assert_eq!(report.collisions.len(), 1);
    let collision = &report.collisions[0];
    assert_eq!(collision.nid, "2AA60DF8");
    assert_eq!(collision.library, "LibC");
    let names: Vec<&str> = collision.candidates.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["sceKernelNid117576", "sceKernelNid140970"]);
}
