use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn billrec() -> Command {
    Command::cargo_bin("billrec").unwrap()
}

/// Empty config file so the user's own configuration never leaks into a test.
fn empty_config(dir: &Path) -> String {
    let path = dir.join("config.json");
    fs::write(&path, "{}").unwrap();
    path.display().to_string()
}

fn accounts_csv(dir: &Path) -> String {
    let path = dir.join("ucs.csv");
    fs::write(&path, "UC,Cod de Reg,Nome\n12345,0101,Escola Municipal\n").unwrap();
    path.display().to_string()
}

#[test]
fn config_init_then_show() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");

    billrec()
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(path.exists());

    billrec()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("verify_window_chars"))
        .stdout(predicate::str::contains("rate-class"));
}

#[test]
fn config_init_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());

    billrec()
        .args(["config", "init", "--output", &config])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn config_set_then_get() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());

    billrec()
        .args(["--config", &config, "config", "set", "extraction.verify_window_chars", "150"])
        .assert()
        .success();

    billrec()
        .args(["--config", &config, "config", "get", "extraction.verify_window_chars"])
        .assert()
        .success()
        .stdout(predicate::str::contains("150"));
}

#[test]
fn missing_config_file_is_an_error() {
    billrec()
        .args(["--config", "/nonexistent/billrec.json", "process", "a.pdf", "--accounts", "ucs.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn process_without_matching_inputs() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());
    let accounts = accounts_csv(dir.path());
    let pattern = format!("{}/*.pdf", dir.path().display());

    billrec()
        .args(["--config", &config, "process", &pattern, "--accounts", &accounts])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn process_rejects_directory_without_required_columns() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());
    let pdf = dir.path().join("fatura.pdf");
    fs::write(&pdf, b"%PDF-1.4").unwrap();
    let accounts = dir.path().join("ucs.csv");
    fs::write(&accounts, "UC,Nome\n12345,Escola\n").unwrap();

    billrec()
        .args(["--config", &config, "process"])
        .arg(&pdf)
        .arg("--accounts")
        .arg(&accounts)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cod de Reg"));
}

#[test]
fn process_collects_unreadable_documents_as_errors() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());
    let accounts = accounts_csv(dir.path());
    let out = dir.path().join("out");
    let pdf = dir.path().join("fatura.pdf");
    fs::write(&pdf, b"this is not a pdf").unwrap();

    billrec()
        .args(["--config", &config, "process"])
        .arg(&pdf)
        .args(["--accounts", &accounts, "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted 0 records, 1 errors (1 distinct)"))
        .stdout(predicate::str::contains("Totals match"));

    let records = fs::read_to_string(out.join("relatorio.csv")).unwrap();
    assert_eq!(records.lines().count(), 1);
    assert!(records.starts_with("UC,Cod de Reg,Nome"));

    let log = fs::read_to_string(out.join("log_erros.txt")).unwrap();
    assert!(log.contains("1. "));
    assert!(log.contains("fatura.pdf"));
}

#[test]
fn process_json_report() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());
    let accounts = accounts_csv(dir.path());
    let pdf = dir.path().join("fatura.pdf");
    fs::write(&pdf, b"garbage").unwrap();

    billrec()
        .args(["--config", &config, "process"])
        .arg(&pdf)
        .args(["--accounts", &accounts, "--format", "json", "--output-dir"])
        .arg(dir.path())
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("relatorio.json")).unwrap()).unwrap();
    assert_eq!(report["records"].as_array().unwrap().len(), 0);
    assert_eq!(report["errors"].as_array().unwrap().len(), 1);
    assert_eq!(report["reconciliation"]["mismatched"], false);
}

#[test]
fn inspect_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(dir.path());

    billrec()
        .args(["--config", &config, "inspect", "/nonexistent/fatura.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}
