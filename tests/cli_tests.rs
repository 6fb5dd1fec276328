//! End-to-end CLI tests using `assert_cmd`.
//!
//! These tests invoke the actual compiled binary and verify exit codes
//! and output. They do NOT require network access or an LLM API key
//! (except tests marked #[ignore]).

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

/// Binary with the config directory and credentials isolated in `home`.
fn cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("learnify").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("GROQ_API_KEY")
        .env_remove("LEARNIFY_PROVIDER");
    cmd
}

fn config_file(home: &Path) -> PathBuf {
    home.join(".config").join("learnify").join("config.toml")
}

/// Write a PDF whose page `i` shows the single line `lines[i]`.
fn write_pdf(dir: &TempDir, lines: &[&str]) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for line in lines {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.path().join("notes.pdf");
    doc.save(&path).unwrap();
    path
}

// ─── Help / version ─────────────────────────────────────────────────────

#[test]
fn test_help_shows_commands() {
    let home = tempdir().unwrap();
    cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("stats"))
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("study"));
}

#[test]
fn test_version_shows_semver() {
    let home = tempdir().unwrap();
    cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("learnify"));
}

// ─── Argument validation ────────────────────────────────────────────────

#[test]
fn test_generate_help() {
    let home = tempdir().unwrap();
    cmd(home.path())
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--pages"))
        .stdout(predicate::str::contains("--quiz"))
        .stdout(predicate::str::contains("--analytics"))
        .stdout(predicate::str::contains("--provider"));
}

#[test]
fn test_generate_requires_pages() {
    let home = tempdir().unwrap();
    cmd(home.path())
        .args(["generate", "notes.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--pages"));
}

#[test]
fn test_generate_rejects_invalid_provider() {
    let home = tempdir().unwrap();
    cmd(home.path())
        .args(["generate", "notes.pdf", "--pages", "1", "--provider", "anthropic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_study_requires_file_without_session() {
    let home = tempdir().unwrap();
    cmd(home.path())
        .arg("study")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FILE"));
}

#[test]
fn test_auth_list_flag() {
    let home = tempdir().unwrap();
    cmd(home.path())
        .args(["auth", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--list"))
        .stdout(predicate::str::contains("--provider"));
}

// ─── Documents ──────────────────────────────────────────────────────────

#[test]
fn test_stats_json() {
    let home = tempdir().unwrap();
    let pdf = write_pdf(&home, &["Cells are small", "Plants need light", "The end"]);

    let output = cmd(home.path())
        .args(["stats", pdf.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total_pages"], 3);
    assert_eq!(stats["total_text_blocks"], 3);
    assert_eq!(stats["total_words"], 8);
    assert_eq!(stats["total_images"], 0);
}

#[test]
fn test_stats_rejects_garbage() {
    let home = tempdir().unwrap();
    let path = home.path().join("broken.pdf");
    fs::write(&path, b"this is not a pdf").unwrap();

    cmd(home.path())
        .args(["stats", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not read PDF"));
}

#[test]
fn test_extract_selected_pages() {
    let home = tempdir().unwrap();
    let pdf = write_pdf(&home, &["First page", "Second page", "Third page"]);

    cmd(home.path())
        .args(["extract", pdf.to_str().unwrap(), "--pages", "3,2"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("--- Page 2 ---"))
        .stdout(predicate::str::contains("Second page"))
        .stdout(predicate::str::contains("--- Page 3 ---"))
        .stdout(predicate::str::contains("First page").not());
}

#[test]
fn test_extract_to_file() {
    let home = tempdir().unwrap();
    let pdf = write_pdf(&home, &["Only page"]);
    let out = home.path().join("out.txt");

    cmd(home.path())
        .args(["extract", pdf.to_str().unwrap(), "-p", "1", "-o", out.to_str().unwrap()])
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("--- Page 1 ---"));
    assert!(text.contains("Only page"));
}

#[test]
fn test_extract_page_out_of_range() {
    let home = tempdir().unwrap();
    let pdf = write_pdf(&home, &["a", "b"]);

    cmd(home.path())
        .args(["extract", pdf.to_str().unwrap(), "--pages", "1,10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Page number 10 exceeds PDF length (2)"));
}

#[test]
fn test_extract_malformed_pages() {
    let home = tempdir().unwrap();
    let pdf = write_pdf(&home, &["a", "b"]);

    cmd(home.path())
        .args(["extract", pdf.to_str().unwrap(), "--pages", "2-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid page specification"));
}

// ─── Configuration and credentials ──────────────────────────────────────

#[test]
fn test_generate_without_credentials() {
    let home = tempdir().unwrap();
    let pdf = write_pdf(&home, &["Some study text"]);

    cmd(home.path())
        .args(["generate", pdf.to_str().unwrap(), "--pages", "1", "--provider", "groq"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GROQ_API_KEY"));
}

#[test]
fn test_init_then_auth() {
    let home = tempdir().unwrap();

    cmd(home.path()).arg("init").assert().success();
    let config = config_file(home.path());
    assert!(config.exists());
    let content = fs::read_to_string(&config).unwrap();
    assert!(content.contains("${GROQ_API_KEY}"));

    cmd(home.path())
        .args(["auth", "--provider", "groq", "--key", "gsk_test_key"])
        .assert()
        .success();
    let content = fs::read_to_string(&config).unwrap();
    assert!(content.contains("api_key = \"gsk_test_key\""));
    assert!(content.contains("${OPENAI_API_KEY}"));

    cmd(home.path())
        .args(["auth", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(from config)"));
}

#[test]
fn test_init_does_not_overwrite() {
    let home = tempdir().unwrap();
    cmd(home.path()).arg("init").assert().success();
    fs::write(config_file(home.path()), "questions_per_set = 7\n").unwrap();

    cmd(home.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
    let content = fs::read_to_string(config_file(home.path())).unwrap();
    assert_eq!(content, "questions_per_set = 7\n");
}

#[test]
fn test_doctor_reports_missing_key() {
    let home = tempdir().unwrap();
    cmd(home.path()).arg("init").assert().success();

    cmd(home.path())
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("Learnify Doctor"))
        .stdout(predicate::str::contains("has no API key"));
}

// ─── Live provider (requires an API key) ────────────────────────────────

#[test]
#[ignore] // Run with: GROQ_API_KEY=... cargo test -- --ignored
fn test_generate_summary_with_groq() {
    let home = tempdir().unwrap();
    let pdf = write_pdf(
        &home,
        &["Mitochondria produce most of the chemical energy used by a cell."],
    );
    let key = std::env::var("GROQ_API_KEY").unwrap();

    cmd(home.path())
        .env("GROQ_API_KEY", key)
        .args(["generate", pdf.to_str().unwrap(), "--pages", "1", "--provider", "groq"])
        .timeout(std::time::Duration::from_secs(120))
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated using Groq (mixtral-8x7b-32768)"));
}
