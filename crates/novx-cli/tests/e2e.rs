//! End-to-end tests for the novx CLI.
//!
//! Tests invoke the `novx` binary as a subprocess against fixture files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

fn novx() -> Command {
    Command::new(env!("CARGO_BIN_EXE_novx"))
}

fn fixture(dir: &Path) -> PathBuf {
    let path = dir.join("voyage.novx");
    let text = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
        <!DOCTYPE novx SYSTEM \"novx_1_3.dtd\">\n\
        <?xml-stylesheet href=\"novx.css\" type=\"text/css\"?>\n\
        <novx version=\"1.3\" xml:lang=\"en-US\">\n\
          <PROJECT>\n    <Title>Voyage</Title>\n  </PROJECT>\n\
          <CHAPTERS>\n    <CHAPTER id=\"ch1\">\n      <Title>One</Title>\n\
              <SECTION id=\"sc1\">\n        <Content><p>one two three</p></Content>\n\
              </SECTION>\n    </CHAPTER>\n  </CHAPTERS>\n\
        </novx>\n";
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn e2e_check_reports_entity_counts() {
    let dir = TempDir::new().unwrap();
    let path = fixture(dir.path());
    let output = novx().arg("check").arg(&path).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("valid novx project"));
    assert!(stdout.contains("chapters:      1"));
    assert!(stdout.contains("sections:      1"));
}

#[test]
fn e2e_check_fails_on_a_newer_version() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("future.novx");
    fs::write(&path, "<novx version=\"2.0\" xml:lang=\"en-US\"></novx>\n").unwrap();
    let output = novx().arg("check").arg(&path).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("newer"));
}

#[test]
fn e2e_check_reports_healing_without_rust_log() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dangling.novx");
    let text = "<novx version=\"1.3\" xml:lang=\"en-US\">\
        <CHAPTERS><CHAPTER id=\"ch1\">\
        <SECTION id=\"sc1\"><Characters ids=\"cr9\" /></SECTION>\
        </CHAPTER></CHAPTERS></novx>\n";
    fs::write(&path, text).unwrap();

    let output = novx().arg("check").arg(&path).env_remove("RUST_LOG").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("dropped 1 dangling reference"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dangling"));
}

#[test]
fn e2e_check_reports_no_healing_on_a_clean_file() {
    let dir = TempDir::new().unwrap();
    let path = fixture(dir.path());
    let output = novx().arg("check").arg(&path).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("healing:       none"));
}

#[test]
fn e2e_stats_emits_json() {
    let dir = TempDir::new().unwrap();
    let path = fixture(dir.path());
    let output = novx().args(["stats", "--json"]).arg(&path).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["words"], 3);
    assert_eq!(value["chapters"][0]["id"], "ch1");
    assert_eq!(value["chapters"][0]["sections"], 1);
}

#[test]
fn e2e_rewrite_normalizes_in_place_with_a_backup() {
    let dir = TempDir::new().unwrap();
    let path = fixture(dir.path());
    let output = novx().arg("rewrite").arg(&path).output().unwrap();
    assert!(
        output.status.success(),
        "rewrite failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(dir.path().join("voyage.novx.bak").exists());

    // The normalized file still checks out.
    let output = novx().arg("check").arg(&path).output().unwrap();
    assert!(output.status.success());
}

#[test]
fn e2e_rewrite_to_another_path_leaves_the_input_alone() {
    let dir = TempDir::new().unwrap();
    let path = fixture(dir.path());
    let before = fs::read(&path).unwrap();
    let out = dir.path().join("normalized.novx");
    let output = novx()
        .arg("rewrite")
        .arg(&path)
        .args(["--output"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(out.exists());
    assert_eq!(fs::read(&path).unwrap(), before);
}
