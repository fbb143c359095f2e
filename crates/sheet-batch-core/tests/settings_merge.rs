use std::path::{Path, PathBuf};

use sheet_batch_core::error::BatchError;
use sheet_batch_core::prelude::*;
use sheet_batch_core::settings::ConfigFormat;

fn settings(pairs: &[(&str, &str)]) -> Settings {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

#[test]
fn override_wins_and_new_keys_are_inserted() {
    let base = settings(&[("--format", "cocos2d"), ("--opt", "RGBA8888")]);
    let over = settings(&[("--opt", "RGBA4444"), ("--scale", "0.5")]);
    let merged = base.merged(&over);

    assert_eq!(merged.get("--format"), Some(&SettingValue::from("cocos2d")));
    assert_eq!(merged.get("--opt"), Some(&SettingValue::from("RGBA4444")));
    assert_eq!(merged.get("--scale"), Some(&SettingValue::from("0.5")));
    // base untouched
    assert_eq!(base.get("--opt"), Some(&SettingValue::from("RGBA8888")));
    assert!(!base.contains_key("--scale"));
}

#[test]
fn overridden_key_keeps_its_position() {
    let base = settings(&[("--a", "1"), ("--b", "2"), ("--c", "3")]);
    let merged = base.merged(&settings(&[("--b", "x")]));
    let keys: Vec<&str> = merged.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["--a", "--b", "--c"]);
}

#[test]
fn lists_are_replaced_not_concatenated() {
    let mut base = Settings::new();
    base.insert("--variant", vec!["1:hd".to_string(), "0.5:sd".to_string()]);
    let mut over = Settings::new();
    over.insert("--variant", vec!["0.25:ld".to_string()]);
    let merged = base.merged(&over);
    assert_eq!(
        merged.get("--variant").and_then(SettingValue::as_list),
        Some(&["0.25:ld".to_string()][..])
    );
}

#[test]
fn merge_is_idempotent() {
    let base = settings(&[("--format", "cocos2d"), ("--opt", "RGBA8888")]);
    let mut over = settings(&[("--opt", "RGBA4444")]);
    over.insert("combine_images", false);
    let once = base.merged(&over);
    let twice = once.merged(&over);
    assert_eq!(once, twice);
}

#[test]
fn merging_empty_overrides_is_identity() {
    let base = settings(&[("--format", "cocos2d")]);
    assert_eq!(base.merged(&Settings::new()), base);
}

#[test]
fn local_config_splits_output_path_from_overrides() {
    let text = r#"{
        "--format": "cocos2d",
        "--multipack": true,
        "--max-size": 2048,
        "output_path": ["ui", "common"],
        "combine_images": false
    }"#;
    let cfg = LocalConfig::parse(text, ConfigFormat::Json, Path::new("texture_packer.json"))
        .expect("parse");
    assert_eq!(
        cfg.output_path,
        Some(vec!["ui".to_string(), "common".to_string()])
    );
    assert!(!cfg.overrides.contains_key("output_path"));
    assert_eq!(cfg.overrides.len(), 4);
    assert_eq!(cfg.overrides.get("--max-size"), Some(&SettingValue::from(2048_i64)));
    assert_eq!(cfg.overrides.get("--multipack"), Some(&SettingValue::Bool(true)));
}

#[test]
fn local_config_reads_yaml() {
    let text = "--format: cocos2d\noutput_path: [hud]\ninput_directories: [icons, frames]\n";
    let cfg = LocalConfig::parse(text, ConfigFormat::Yaml, Path::new("texture_packer.yaml"))
        .expect("parse");
    assert_eq!(cfg.output_path, Some(vec!["hud".to_string()]));
    let opts = BatchOptions::from_settings(&cfg.overrides).expect("options");
    assert_eq!(
        opts.input_directories,
        vec![PathBuf::from("icons"), PathBuf::from("frames")]
    );
}

#[test]
fn config_format_follows_extension() {
    assert_eq!(ConfigFormat::from_path(Path::new("a/texture_packer.json")), ConfigFormat::Json);
    assert_eq!(ConfigFormat::from_path(Path::new("a/texture_packer.yml")), ConfigFormat::Yaml);
    assert_eq!(ConfigFormat::from_path(Path::new("a/texture_packer.YAML")), ConfigFormat::Yaml);
    assert_eq!("yaml".parse::<ConfigFormat>(), Ok(ConfigFormat::Yaml));
    assert!("toml".parse::<ConfigFormat>().is_err());
}

#[test]
fn malformed_config_is_a_parse_error() {
    let result = LocalConfig::parse("{ \"--format\": ", ConfigFormat::Json, Path::new("bad.json"));
    match result {
        Err(BatchError::ConfigParse { path, .. }) => assert_eq!(path, PathBuf::from("bad.json")),
        other => panic!("expected ConfigParse, got {other:?}"),
    }
}

#[test]
fn non_mapping_config_is_a_parse_error() {
    let result = LocalConfig::parse("[1, 2]", ConfigFormat::Json, Path::new("list.json"));
    assert!(matches!(result, Err(BatchError::ConfigParse { .. })));
}

#[test]
fn scalar_output_path_is_invalid() {
    let result = LocalConfig::parse(
        r#"{"output_path": "ui"}"#,
        ConfigFormat::Json,
        Path::new("texture_packer.json"),
    );
    match result {
        Err(BatchError::InvalidConfig(msg)) => assert!(msg.contains("output_path")),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn missing_config_file_loads_as_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loaded = LocalConfig::load_in_dir(dir.path(), "texture_packer.json").expect("load");
    assert!(loaded.is_none());
}

#[test]
fn batch_options_defaults() {
    let opts = BatchOptions::from_settings(&Settings::new()).expect("options");
    assert!(opts.flatten_path);
    assert!(opts.combine_images);
    assert_eq!(opts.sheet_extension, "pvr.ccz");
    assert_eq!(opts.data_extension, "plist");
    assert_eq!(opts.input_directories, vec![PathBuf::from(".")]);
}

#[test]
fn batch_options_reject_wrong_types() {
    let mut s = Settings::new();
    s.insert("combine_images", "no");
    match BatchOptions::from_settings(&s) {
        Err(BatchError::InvalidConfig(msg)) => assert!(msg.contains("combine_images")),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }

    let mut s = Settings::new();
    s.insert("input_directories", ".");
    assert!(BatchOptions::from_settings(&s).is_err());
}

#[test]
fn values_render_as_single_packer_tokens() {
    assert_eq!(SettingValue::from(true).to_string(), "true");
    assert_eq!(SettingValue::from(false).to_string(), "false");
    assert_eq!(
        SettingValue::from(vec!["a".to_string(), "b".to_string()]).to_string(),
        "a,b"
    );
    assert_eq!(SettingValue::from(2048_i64).to_string(), "2048");
}
