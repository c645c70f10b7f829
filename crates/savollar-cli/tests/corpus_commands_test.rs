//! Integration tests for the offline corpus commands (import, search,
//! popular, status). Chat commands need a live LLM service and are covered
//! by the core pipeline tests with stubs.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn savollar_cmd(db_path: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("savollar").unwrap();
    cmd.env("SAVOLLAR_DB", db_path);
    cmd
}

fn setup_corpus() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("corpus.sqlite");

    let jsonl = concat!(
        r#"{"url": "https://savollar.islom.uz/s/1", "title": "Намоз вақтлари", "answer": "Намоз беш маҳал ўқилади.", "view_count": 120}"#,
        "\n",
        r#"{"url": "https://savollar.islom.uz/s/2", "title": "Рўза туткан киши", "answer": "Рўза ҳақида жавоб.", "view_count": 40}"#,
        "\n",
        "bu json emas\n",
        r#"{"url": "https://savollar.islom.uz/s/3", "title": "Закот нисоби", "answer": "Закот нисоби ҳақида, намоз ҳам тилга олинган.", "view_count": 300}"#,
        "\n",
    );
    let jsonl_path = dir.path().join("corpus.jsonl");
    fs::write(&jsonl_path, jsonl).unwrap();

    savollar_cmd(&db_path)
        .arg("import")
        .arg(&jsonl_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 documents (1 skipped)"));

    (dir, db_path)
}

#[test]
fn test_import_then_status() {
    let (_dir, db_path) = setup_corpus();

    savollar_cmd(&db_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Questions:          3"))
        .stdout(predicate::str::contains("Without embeddings: 3"));
}

#[test]
fn test_search_ranks_title_hits_first() {
    let (_dir, db_path) = setup_corpus();

    let output = savollar_cmd(&db_path)
        .arg("search")
        .arg("намоз")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();

    let title_pos = stdout.find("Намоз вақтлари").unwrap();
    let body_pos = stdout.find("Закот нисоби").unwrap();
    assert!(title_pos < body_pos, "title hit should rank above body hit");
}

#[test]
fn test_search_json_format() {
    let (_dir, db_path) = setup_corpus();

    let output = savollar_cmd(&db_path)
        .arg("search")
        .arg("закот")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("output should be valid JSON");
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "Закот нисоби");
}

#[test]
fn test_search_without_keywords_fails() {
    let (_dir, db_path) = setup_corpus();

    savollar_cmd(&db_path)
        .arg("search")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no keywords"));
}

#[test]
fn test_popular_orders_by_view_count() {
    let (_dir, db_path) = setup_corpus();

    let output = savollar_cmd(&db_path).arg("popular").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();

    let zakot = stdout.find("Закот нисоби").unwrap();
    let namoz = stdout.find("Намоз вақтлари").unwrap();
    let roza = stdout.find("Рўза туткан киши").unwrap();
    assert!(zakot < namoz && namoz < roza);
}

#[test]
fn test_import_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("corpus.sqlite");

    savollar_cmd(&db_path)
        .arg("import")
        .arg(dir.path().join("yoq.jsonl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open"));
}
