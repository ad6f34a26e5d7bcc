use std::fs;
use std::path::Path;

use paperwork_cli::catalog::builtin_templates;
use paperwork_cli::config::{PaperworkConfig, load_config, load_or_default, save_config};

#[test]
fn save_then_load_keeps_catalogue_and_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let config = PaperworkConfig::defaults_in(dir.path());

    save_config(&path, &config).unwrap();
    let loaded = load_config(&path).unwrap();

    assert_eq!(loaded.config_version, 1);
    assert_eq!(loaded.serial_path, dir.path().join("serial.txt"));
    assert_eq!(loaded.templates, builtin_templates());
    assert_eq!(loaded.converter, config.converter);
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn missing_file_falls_back_to_defaults_next_to_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let config = load_or_default(&path).unwrap();

    assert_eq!(config.template_dir, dir.path().join("templates"));
    assert!(config.template("sat").is_ok());
    assert!(!path.exists());
}

#[test]
fn unversioned_config_is_migrated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "serial_path": "/srv/paperwork/serial.txt",
            "template_dir": "/srv/paperwork/templates",
            "output_dir": "out",
            "converter": { "program": "libreoffice", "timeout_secs": 60 },
            "templates": []
        }"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();

    assert_eq!(config.config_version, 1);
    let converter = config.converter.unwrap();
    assert_eq!(converter.program, "libreoffice");
    assert_eq!(converter.timeout_secs, 60);
    assert!(config.templates.is_empty());
}

#[test]
fn newer_config_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut json = serde_json::to_value(PaperworkConfig::defaults_in(dir.path())).unwrap();
    json["config_version"] = serde_json::json!(99);
    fs::write(&path, json.to_string()).unwrap();

    let err = load_config(&path).unwrap_err();

    assert!(err.to_string().contains("newer than this build supports"));
}

#[test]
fn config_version_beyond_u32_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut json = serde_json::to_value(PaperworkConfig::defaults_in(dir.path())).unwrap();
    json["config_version"] = serde_json::json!(4_294_967_297u64);
    fs::write(&path, json.to_string()).unwrap();

    let err = load_config(&path).unwrap_err();

    assert!(err.to_string().contains("4294967297"));
}

#[test]
fn template_with_unknown_total_part_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut config = PaperworkConfig::defaults_in(dir.path());
    config.templates[0].fields.push(paperwork_core::fields::FieldSpec::new(
        "Grand Total",
        paperwork_core::fields::FieldKind::Total {
            of: vec!["Nonexistent Fee".to_string()],
        },
    ));
    save_config(&path, &config).unwrap();

    let err = load_config(&path).unwrap_err();

    assert!(err.to_string().contains("Nonexistent Fee"));
}

#[test]
fn relative_template_files_resolve_against_template_dir() {
    let config = PaperworkConfig::defaults_in(Path::new("/etc/paperwork"));
    let sat = config.template("sat").unwrap();

    assert_eq!(
        config.template_path(sat),
        Path::new("/etc/paperwork/templates")
            .join("SAMPLE VAT registration and VAT filling -SME package.docx")
    );

    let err = config.template("nda").unwrap_err().to_string();
    assert!(err.contains("sat, service-agreement, invoice"));
}
