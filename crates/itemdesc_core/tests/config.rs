use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use itemdesc_core::config::Config;
use itemdesc_core::core_api::{Category, CoreErrorCode};

fn temp_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "itemdesc_{}_{}_{}",
        prefix,
        std::process::id(),
        nanos
    ));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

#[test]
fn missing_config_is_created_with_defaults() {
    let dir = temp_test_dir("config_missing");
    let path = dir.join("itemdesc-modder.conf");

    let config = Config::load_or_create(&path);
    assert_eq!(config, Config::default());

    let written = fs::read_to_string(&path).expect("defaults should be persisted");
    assert!(written.contains("\"ItemIdDescTextColor\": \"007ACC\""));
    assert!(written.contains("\"EnableTags\": 1"));
    assert_eq!(Config::from_json(&written).expect("written config should parse"), config);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn corrupt_config_is_replaced_with_defaults() {
    let dir = temp_test_dir("config_corrupt");
    let path = dir.join("itemdesc-modder.conf");
    fs::write(&path, "{ \"ItemIdDescTextColor\": ").expect("seed corrupt config");

    let config = Config::load_or_create(&path);
    assert_eq!(config, Config::default());

    let written = fs::read_to_string(&path).expect("defaults should be persisted");
    assert_eq!(Config::from_json(&written).expect("rewritten config should parse"), config);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn existing_config_is_loaded_as_is() {
    let dir = temp_test_dir("config_existing");
    let path = dir.join("itemdesc-modder.conf");

    let mut custom = Config::default();
    custom.quest.tag_label = "Q".to_string();
    custom.instance.tags_enabled = false;
    custom.write(&path).expect("write custom config");

    assert_eq!(Config::load_or_create(&path), custom);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn switches_accept_integers_and_booleans_with_camel_case_keys() {
    let policy = r#"{
        "enableTags": 0,
        "enableDescriptions": true,
        "tagText": "Brew",
        "descriptionHeaderColor": "111111",
        "descriptionRowsColor": "222222"
    }"#;
    let json = format!(
        r#"{{
            "itemIdDescTextColor": "AAAAAA",
            "itemIdDescValueColor": "BBBBBB",
            "brewingConfig": {policy},
            "cookingConfig": {policy},
            "questConfig": {policy},
            "instanceConfig": {policy}
        }}"#
    );

    let config = Config::from_json(&json).expect("camelCase config should parse");
    let brewing = config.policy(Category::Brewing);
    assert!(!brewing.tags_enabled);
    assert!(brewing.descriptions_enabled);
    assert!(brewing.detailed_descriptions_enabled);
    assert_eq!(brewing.header_label, "");
    assert_eq!(brewing.header_label_or("Brewing Material"), "Brewing Material");
    assert_eq!(config.item_id_label_color, "AAAAAA");
}

#[test]
fn incomplete_config_is_rejected() {
    let err = Config::from_json(r#"{"ItemIdDescTextColor":"007ACC"}"#)
        .expect_err("missing categories should fail");
    assert_eq!(err.code, CoreErrorCode::Config);
}

#[test]
fn policy_lookup_covers_every_category() {
    let config = Config::default();
    let labels: Vec<&str> = Category::ALL
        .iter()
        .map(|category| config.policy(*category).tag_label.as_str())
        .collect();
    assert_eq!(labels, vec!["Brew", "Cook", "Quest", "Instance"]);
    assert!(!config.policy(Category::Brewing).detailed_descriptions_enabled);
}
