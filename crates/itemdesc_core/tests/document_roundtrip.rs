use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use itemdesc_core::core_api::CoreErrorCode;
use itemdesc_core::document::TableDocument;
use itemdesc_core::lua::{self, Entry, Key};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn load_sample() -> TableDocument {
    TableDocument::load(&fixture_path("itemInfo_sample.lua"), "tbl")
        .expect("failed to load sample item table")
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

fn assert_trailing_comma_law(text: &str) {
    let lines: Vec<&str> = text.lines().collect();
    for pair in lines.windows(2) {
        let current = pair[0].trim_end();
        let next = pair[1].trim_start();
        if current.ends_with('{') {
            continue;
        }
        if next.starts_with('}') {
            assert!(
                !current.ends_with(','),
                "last entry before `{next}` has a trailing comma: {current}"
            );
        } else {
            assert!(
                current.ends_with(','),
                "entry followed by `{next}` is missing its comma: {current}"
            );
        }
    }
}

#[test]
fn sample_lists_item_ids_in_file_order() {
    let doc = load_sample();
    assert_eq!(doc.declared_name(), "tbl");
    assert_eq!(doc.item_ids(), vec![501, 909, 7033, 1201]);

    let knife = doc.item(1201).expect("knife should be present");
    assert_eq!(
        knife.field("identifiedDisplayName").and_then(Entry::as_str),
        Some("Knife")
    );
    assert_eq!(knife.field("slotCount"), Some(&Entry::Number(3.0)));
    assert_eq!(knife.field("costume"), Some(&Entry::Bool(false)));
}

#[test]
fn reparsing_rendered_output_yields_the_same_tree() {
    let doc = load_sample();
    let reparsed = TableDocument::parse(&doc.to_bytes(), "tbl").expect("output should reparse");
    assert_eq!(reparsed.root, doc.root);
    assert_eq!(reparsed.item_ids(), doc.item_ids());
}

#[test]
fn text_outside_the_table_is_preserved_byte_for_byte() {
    let mut input = b"-- caf\xE9 \x80 header\r\nlocal x = 1\r\ntbl = {\r\n\t[1] = { identifiedDisplayName = \"A\" }\r\n}\r\n-- trailing \x93quoted\x94\r\n".to_vec();
    input.extend_from_slice(&[0x81, 0x8D, 0xFF]);

    let doc = TableDocument::parse(&input, "tbl").expect("input should parse");
    let output = doc.to_bytes();

    let prefix = b"-- caf\xE9 \x80 header\r\nlocal x = 1\r\ntbl = ";
    assert!(output.starts_with(prefix));

    let mut suffix = b"\r\n-- trailing \x93quoted\x94\r\n".to_vec();
    suffix.extend_from_slice(&[0x81, 0x8D, 0xFF]);
    assert!(output.ends_with(&suffix));
}

#[test]
fn rendered_table_obeys_trailing_comma_law() {
    let doc = load_sample();
    let text = lua::render(&doc.root);
    assert!(text.starts_with("{\n"));
    assert!(text.ends_with("\n}"));
    assert_trailing_comma_law(&text);
}

#[test]
fn legacy_bytes_inside_strings_survive_roundtrip() {
    let input = b"tbl = {\n\t[5] = { identifiedDisplayName = \"\xC9p\xE9e\", identifiedDescriptionName = { \"\x80 100\" } }\n}\n";
    let doc = TableDocument::parse(input, "tbl").expect("input should parse");
    assert_eq!(
        doc.item(5)
            .and_then(|item| item.field("identifiedDisplayName"))
            .and_then(Entry::as_str),
        Some("\u{C9}p\u{E9}e")
    );

    let output = doc.to_bytes();
    assert!(output.windows(6).any(|w| w == b"\"\xC9p\xE9e\""));
    assert!(output.windows(5).any(|w| w == b"\"\x80 10"));
}

#[test]
fn save_replaces_existing_output() {
    let path = temp_output_path("save_replace");
    fs::write(&path, "stale content that is much longer than nothing at all").expect("seed file");

    let doc = TableDocument::parse(b"tbl = { [1] = { identifiedDisplayName = \"A\" } }", "tbl")
        .expect("input should parse");
    let expected = doc.to_bytes();
    doc.save(&path).expect("save should succeed");

    let written = fs::read(&path).expect("output should exist");
    assert_eq!(written, expected);
    assert!(!String::from_utf8_lossy(&written).contains("stale"));

    let _ = fs::remove_file(&path);
}

#[test]
fn missing_declaration_reports_not_found() {
    let err = TableDocument::parse(b"items = { [1] = {} }", "tbl").expect_err("should fail");
    assert_eq!(err.code, CoreErrorCode::NotFound);
}

#[test]
fn unbalanced_table_reports_malformed() {
    let err = TableDocument::parse(
        b"tbl = {\n\t[1] = {\n\t\tidentifiedDisplayName = \"A\"\n}\n",
        "tbl",
    )
    .expect_err("should fail");
    assert_eq!(err.code, CoreErrorCode::MalformedTable);
}

#[test]
fn unreadable_input_reports_io() {
    let err = TableDocument::load(&fixture_path("does_not_exist.lua"), "tbl")
        .expect_err("should fail");
    assert_eq!(err.code, CoreErrorCode::Io);
}

#[test]
fn with_item_skips_absent_ids() {
    let mut doc = load_sample();
    let before = doc.root.clone();

    let visited = doc.with_item(424242, |mut item| {
        item.insert("identifiedDisplayName", "changed");
        item
    });

    assert!(!visited);
    assert_eq!(doc.root, before);
}

#[test]
fn with_item_stores_returned_table() {
    let mut doc = load_sample();
    let visited = doc.with_item(909, |mut item| {
        item.insert("identifiedDisplayName", "Shiny Jellopy");
        item
    });

    assert!(visited);
    let item = doc.item(909).expect("item should remain a table");
    assert_eq!(
        item.field("identifiedDisplayName").and_then(Entry::as_str),
        Some("Shiny Jellopy")
    );
    assert_eq!(doc.item_ids(), vec![501, 909, 7033, 1201]);
    assert!(doc.root.get(&Key::Index(909)).is_some());
}
