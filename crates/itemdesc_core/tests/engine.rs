use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use itemdesc_core::config::Config;
use itemdesc_core::core_api::{Category, CoreError, CoreErrorCode, Engine};
use itemdesc_core::document::TableDocument;
use itemdesc_core::lua::Entry;
use itemdesc_core::materials::{CategorySource, DirectorySource};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn temp_output_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "itemdesc_{prefix}_{}_{}.lua",
        std::process::id(),
        nanos
    ))
}

struct OfflineSource;

impl CategorySource for OfflineSource {
    fn fetch(&self, category: Category) -> Result<String, CoreError> {
        Err(CoreError::new(
            CoreErrorCode::FetchFailed,
            format!("{category} data unavailable"),
        ))
    }
}

#[test]
fn process_writes_decorated_table_and_keeps_surrounding_text() {
    let input = fixture_path("itemInfo_sample.lua");
    let output = temp_output_path("engine_process");

    let summary = Engine::new(Config::default())
        .process(&input, &DirectorySource::new(fixture_path("data")), &output)
        .expect("processing should succeed");

    assert_eq!(summary.item_count, 4);
    assert_eq!(summary.decorated.get(&Category::Brewing), Some(&1));
    assert_eq!(summary.output, output);

    let original = fs::read(&input).expect("fixture should be readable");
    let written = fs::read(&output).expect("output should exist");
    let header = b"-- Item descriptions for the English client.\n-- Encoding: Windows-1252\n\ntbl = {\n";
    assert!(written.starts_with(header));
    let footer_start = original
        .windows(b"\n\nfunction main()".len())
        .position(|w| w == b"\n\nfunction main()")
        .expect("fixture has a footer");
    assert!(written.ends_with(&original[footer_start..]));

    let doc = TableDocument::load(&output, "tbl").expect("output should reload");
    assert_eq!(
        doc.item(501)
            .and_then(|item| item.field("identifiedDisplayName"))
            .and_then(Entry::as_str),
        Some("[Brew] Red Potion")
    );
    assert_eq!(
        doc.item(501)
            .and_then(|item| item.field("unidentifiedDisplayName"))
            .and_then(Entry::as_str),
        Some("Red Potion")
    );

    let _ = fs::remove_file(&output);
}

#[test]
fn fetch_failure_writes_nothing() {
    let output = temp_output_path("engine_fetch_failure");
    let err = Engine::new(Config::default())
        .process(&fixture_path("itemInfo_sample.lua"), &OfflineSource, &output)
        .expect_err("offline source should fail");

    assert_eq!(err.code, CoreErrorCode::FetchFailed);
    assert!(!output.exists());
}

#[test]
fn wrong_table_name_writes_nothing() {
    let output = temp_output_path("engine_not_found");
    let err = Engine::new(Config::default())
        .with_table_name("items")
        .process(
            &fixture_path("itemInfo_sample.lua"),
            &DirectorySource::new(fixture_path("data")),
            &output,
        )
        .expect_err("unknown table should fail");

    assert_eq!(err.code, CoreErrorCode::NotFound);
    assert!(!output.exists());
}
