use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn spendlog(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("spendlog").unwrap();
    cmd.env("SPENDLOG_DATA_DIR", data_dir.path())
        .env_remove("SPENDLOG_USER")
        .env_remove("GEMINI_API_KEY");
    cmd
}

const IMPORT_CSV: &str = "\
Date,Transaction ID,Place,Address,Category,Payment Method,Amount,Review Status
2024-03-01,TXN-100001,Lowe's Home,\"12 Main St, Springfield\",Repair,Credit Card,45.10,Verified
2024-03-02,TXN-100002,Shell,Route 9,Gas,Cash,30.00,Review Later
2024-03-03,TXN-100003,Broken
";

#[test]
fn test_no_command_prints_hint() {
    let dir = TempDir::new().unwrap();
    spendlog(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("spendlog --help"));
}

#[test]
fn test_add_then_list() {
    let dir = TempDir::new().unwrap();
    spendlog(&dir)
        .args(["add", "Corner Cafe", "12.50", "--date", "2024-02-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created expense"))
        .stdout(predicate::str::contains("Corner Cafe"));

    spendlog(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Corner Cafe"))
        .stdout(predicate::str::contains("12.50"));
}

#[test]
fn test_add_rejects_bad_amount() {
    let dir = TempDir::new().unwrap();
    spendlog(&dir)
        .args(["add", "Corner Cafe", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));
}

#[test]
fn test_users_are_isolated() {
    let dir = TempDir::new().unwrap();
    spendlog(&dir)
        .args(["--user", "alex", "add", "Bookshop", "9.99"])
        .assert()
        .success();

    spendlog(&dir)
        .args(["--user", "sam", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No expenses found."));
}

#[test]
fn test_invalid_user_rejected() {
    let dir = TempDir::new().unwrap();
    spendlog(&dir)
        .args(["--user", "../escape", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid user name"));
}

#[test]
fn test_import_then_summary() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("bank.csv");
    fs::write(&csv_path, IMPORT_CSV).unwrap();

    spendlog(&dir)
        .arg("import")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 expenses."))
        .stdout(predicate::str::contains("Skipped 1 malformed rows."));

    spendlog(&dir)
        .args(["summary", "--month", "2024-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$75.10"))
        .stdout(predicate::str::contains("Repair"));
}

#[test]
fn test_import_header_only_fails() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("empty.csv");
    fs::write(&csv_path, "Date,Transaction ID,Place\n").unwrap();

    spendlog(&dir)
        .arg("import")
        .arg(&csv_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input format error"));
}

#[test]
fn test_export_writes_file() {
    let dir = TempDir::new().unwrap();
    spendlog(&dir)
        .args(["add", "Shell", "30", "--category", "Gas", "--date", "2024-01-05"])
        .assert()
        .success();

    let out = dir.path().join("out.csv");
    spendlog(&dir)
        .arg("export")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 expenses"));

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("Date,Transaction ID,Place"));
    assert!(text.contains("\"Shell\",\"\",Gas,Credit Card,30.00,Verified"));
}

#[test]
fn test_export_empty_view_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.csv");
    spendlog(&dir)
        .arg("export")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to export."));
    assert!(!out.exists());
}

#[test]
fn test_scan_without_key_fails_before_quota() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("receipt.jpg");
    fs::write(&image, b"\xff\xd8\xff").unwrap();

    spendlog(&dir)
        .arg("scan")
        .arg(&image)
        .assert()
        .failure();

    spendlog(&dir)
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Scans used today: 0/20"));
}
