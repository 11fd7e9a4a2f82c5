use nidscope_core::analysis::DetectorSettings;
use nidscope_core::db::{ProjectConfig, ProjectContext, ProjectLayout, SourceRecord};
use nidscope_core::model::NidEntry;
use tempfile::tempdir;

fn write_project(root: &std::path::Path, config: &ProjectConfig) -> ProjectLayout {
    let layout = ProjectLayout::new(root);
    std::fs::create_dir_all(&layout.meta_dir).expect("meta dir");
    let json = serde_json::to_string_pretty(config).expect("serialize");
    std::fs::write(&layout.project_config_path, json).expect("write config");
    layout
}

fn seed(ctx: &ProjectContext) {
    let releases: [(&str, &[(&str, &str)]); 2] = [
        (
            "5.55",
            &[
                ("446D8DE6", "sceKernelCreateThread"),
                ("F475845D", "sceKernelStartThread"),
                ("AA73C935", "sceKernelExitThread"),
                ("CEADEB47", "sceKernelDelayThread"),
            ],
        ),
        (
            "6.00",
            &[
                ("446D8DE6", "sceKernelCreateThread"),
                ("109F50BC", "sceIoOpen"),
                ("BBBB0001", "sceKernelStartThread"),
                ("BBBB0002", "sceKernelExitThread"),
                ("BBBB0003", "sceKernelDelayThread"),
            ],
        ),
    ];
    for (version, pairs) in releases {
        let entries: Vec<NidEntry> = pairs
            .iter()
            .map(|(nid, name)| {
                NidEntry::new(*nid, *name, "ThreadManForKernel", "threadman.prx", version)
            })
            .collect();
        let source = SourceRecord {
            path: format!("{version}.xml"),
            version: version.to_string(),
            sha256: version.to_string(),
            imported_at: "2024-01-01T00:00:00Z".to_string(),
        };
        ctx.db.import_source(&source, &entries).expect("import");
    }
}

#[test]
fn context_opens_relative_db_path() {
    let dir = tempdir().expect("tempdir");
    let layout = ProjectLayout::new(dir.path());
    let config = ProjectConfig::new("demo", layout.db_path_relative_string());
    write_project(dir.path(), &config);

    let ctx = ProjectContext::from_root(dir.path()).expect("context");
    assert_eq!(ctx.config.name, "demo");
    assert_eq!(ctx.db_path, layout.db_path);
    assert!(ctx.db_path.exists());
    assert_eq!(ctx.config.detector, DetectorSettings::default());
}

#[test]
fn missing_config_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let err = ProjectContext::from_root(dir.path()).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to read project config"));
}

#[test]
fn default_exception_table_lets_5_55_randomize() {
    let dir = tempdir().expect("tempdir");
    let layout = ProjectLayout::new(dir.path());
    write_project(dir.path(), &ProjectConfig::new("demo", layout.db_path_relative_string()));

    let ctx = ProjectContext::from_root(dir.path()).expect("context");
    seed(&ctx);
    let corpus = ctx.db.load_corpus(None).expect("corpus");
    let report = ctx.aggregator().analyze(&corpus).expect("analyze");
    let step = report.libraries[0].step("6.00").expect("step");
    assert!(step.randomized);
    assert!(step.transition.as_ref().is_some_and(|t| t.exception_applied));
}

#[test]
fn configured_exceptions_replace_the_default() {
    let dir = tempdir().expect("tempdir");
    let layout = ProjectLayout::new(dir.path());
    let mut config = ProjectConfig::new("demo", layout.db_path_relative_string());
    config.detector.exceptions.clear();
    write_project(dir.path(), &config);

    let ctx = ProjectContext::from_root(dir.path()).expect("context");
    seed(&ctx);
    let corpus = ctx.db.load_corpus(None).expect("corpus");
    let report = ctx.aggregator().analyze(&corpus).expect("analyze");
    let step = report.libraries[0].step("6.00").expect("step");
    assert!(!step.randomized);
    assert!(step.transition.as_ref().is_some_and(|t| t.verified_new_nid.is_some()));
}

#[test]
fn config_without_detector_section_uses_defaults() {
    let dir = tempdir().expect("tempdir");
    let layout = ProjectLayout::new(dir.path());
    std::fs::create_dir_all(&layout.meta_dir).expect("meta dir");
    let json = r#"{
        "name": "legacy",
        "description": null,
        "config_version": "0.1.0",
        "db": { "path": ".nidscope/project.db" }
    }"#;
    std::fs::write(&layout.project_config_path, json).expect("write config");

    let ctx = ProjectContext::from_root(dir.path()).expect("context");
    assert_eq!(ctx.config.detector.exceptions.len(), 1);
    assert_eq!(ctx.config.detector.exceptions[0].version, "5.55");
}

#[test]
fn absolute_db_path_is_used_as_is() {
    let dir = tempdir().expect("tempdir");
    let elsewhere = tempdir().expect("tempdir");
    let db_path = elsewhere.path().join("shared.db");
    let config = ProjectConfig::new("demo", db_path.to_string_lossy());
    let layout = ProjectLayout::new(dir.path());
    std::fs::create_dir_all(&layout.meta_dir).expect("meta dir");
    config.write_to(&layout.project_config_path).expect("write config");

    let ctx = ProjectContext::from_root(dir.path()).expect("context");
    assert_eq!(ctx.db_path, db_path);
    assert!(db_path.exists());
    assert!(!layout.db_path.exists());
}
