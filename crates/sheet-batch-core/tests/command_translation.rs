use sheet_batch_core::options::FLAG_OPTIONS;
use sheet_batch_core::prelude::*;

#[test]
fn value_options_emit_flag_and_value() {
    let mut s = Settings::new();
    s.insert("--format", "cocos2d");
    s.insert("--max-size", 2048_i64);
    s.insert("--scale", SettingValue::Number(serde_json::Number::from_f64(0.5).expect("finite")));
    assert_eq!(
        translate(&s),
        vec!["--format", "cocos2d", "--max-size", "2048", "--scale", "0.5"]
    );
}

#[test]
fn flag_options_never_emit_a_value() {
    for flag in FLAG_OPTIONS {
        let mut s = Settings::new();
        s.insert(*flag, true);
        assert_eq!(translate(&s), vec![flag.to_string()], "{flag}");

        // presence is the signal, even for a false-ish value
        let mut s = Settings::new();
        s.insert(*flag, false);
        assert_eq!(translate(&s), vec![flag.to_string()], "{flag}");
    }
}

#[test]
fn variant_repeats_per_item_in_order() {
    let mut s = Settings::new();
    s.insert(
        "--variant",
        vec!["1:-hd".to_string(), "0.5:".to_string(), "0.25:-ld".to_string()],
    );
    assert_eq!(
        translate(&s),
        vec!["--variant", "1:-hd", "--variant", "0.5:", "--variant", "0.25:-ld"]
    );
}

#[test]
fn scalar_variant_is_a_single_item() {
    let mut s = Settings::new();
    s.insert("--variant", "1:-hd");
    assert_eq!(translate(&s), vec!["--variant", "1:-hd"]);
}

#[test]
fn convenience_keys_are_not_forwarded() {
    let mut s = Settings::new();
    s.insert("flatten_path", false);
    s.insert("sheet_extension", "png");
    s.insert("data_extension", "json");
    s.insert("input_directories", vec!["a".to_string()]);
    s.insert("combine_images", false);
    s.insert("--opt", "RGBA4444");
    assert_eq!(translate(&s), vec!["--opt", "RGBA4444"]);
}

#[test]
fn booleans_and_lists_stringify() {
    let mut s = Settings::new();
    s.insert("--trim-sprite-names", true);
    s.insert("--ignore-files", vec!["*.psd".to_string(), "*.tmp".to_string()]);
    assert_eq!(
        translate(&s),
        vec!["--trim-sprite-names", "true", "--ignore-files", "*.psd,*.tmp"]
    );
}

#[test]
fn translation_is_deterministic_and_follows_key_order() {
    let mut s = Settings::new();
    s.insert("--opt", "RGBA8888");
    s.insert("--multipack", true);
    s.insert("--format", "cocos2d");
    s.insert("--variant", vec!["1:hd".to_string()]);
    let first = translate(&s);
    let second = translate(&s.clone());
    assert_eq!(first, second);
    assert_eq!(
        first,
        vec![
            "--opt",
            "RGBA8888",
            "--multipack",
            "--format",
            "cocos2d",
            "--variant",
            "1:hd"
        ]
    );
}

#[test]
fn option_kinds() {
    assert_eq!(OptionKind::of("--variant"), Some(OptionKind::Repeated));
    assert_eq!(OptionKind::of("--shape-debug"), Some(OptionKind::Flag));
    assert_eq!(OptionKind::of("--format"), Some(OptionKind::Value));
    assert_eq!(OptionKind::of("flatten_path"), None);
    assert_eq!(OptionKind::of("-v"), None);
}
