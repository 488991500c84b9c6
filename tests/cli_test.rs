use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const CARD: &str = "demos/card.json";

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trellis"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(args)
        .output()
        .expect("Failed to execute trellis")
}

#[test]
fn test_tree_output_for_card() {
    assert!(Path::new(env!("CARGO_MANIFEST_DIR")).join(CARD).exists(), "Demo not found: {}", CARD);

    let output = run(&[CARD, "--width", "320"]);
    assert!(output.status.success(), "trellis failed: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("card pos:(0, 0) size:(320, 64)"), "unexpected root: {}", stdout);
    assert!(stdout.contains("├── avatar pos:(8, 8) size:(48, 48)"));
    assert!(stdout.contains("└── body pos:(64, 8) size:(248, 48)"));
    assert!(stdout.contains("title \"Layout engines\" pos:(0, 0) size:(248, 16)"));
    assert!(stdout.contains("summary \"Flex containers size their children along two axes\" pos:(0, 16) size:(248, 32)"));
}

#[test]
fn test_rtl_mirrors_card() {
    let output = run(&[CARD, "--width", "320", "--direction", "rtl"]);
    assert!(output.status.success(), "trellis failed: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("├── avatar pos:(264, 8) size:(48, 48)"), "unexpected layout: {}", stdout);
    assert!(stdout.contains("└── body pos:(8, 8) size:(248, 48)"));
}

#[test]
fn test_json_output_to_file() {
    let path = std::env::temp_dir().join(format!("trellis-cli-{}.json", std::process::id()));
    let path_arg = path.to_string_lossy().to_string();

    let output = run(&[CARD, "--width", "320", "--format", "json", "--output", &path_arg]);
    assert!(output.status.success(), "trellis failed: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty(), "JSON should go to the file");

    let written = fs::read_to_string(&path).expect("Output file missing");
    fs::remove_file(&path).ok();
    let value: serde_json::Value = serde_json::from_str(&written).expect("Output is not JSON");
    assert_eq!(value["name"], "card");
    assert_eq!(value["layout"]["width"], 320.0);
    assert_eq!(value["children"][0]["layout"]["margin"][2], 8.0);
    assert_eq!(value["children"][1]["children"][1]["text"], "Flex containers size their children along two axes");
}

#[test]
fn test_detailed_output_reports_cache() {
    let output = run(&[CARD, "--width", "320", "--format", "detailed"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("=== TRELLIS LAYOUT ==="));
    assert!(stdout.contains("Nodes: 5"));
    assert!(stdout.contains("Cache: "));
    assert!(stdout.contains("• padding: left=8 top=8 right=8 bottom=8"));
}

#[test]
fn test_missing_document_fails() {
    let output = run(&["demos/does-not-exist.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Document not found"));
}
