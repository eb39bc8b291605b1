use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn tillroll(config_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("tillroll").unwrap();
    // Keep the user's real config out of the way.
    let config = config_dir.join("config.json");
    fs::write(&config, "{}").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn process_outputs_table_layout_json() {
    let dir = tempdir().unwrap();
    let output = tillroll(dir.path())
        .arg("process")
        .arg(fixture("tesco.json"))
        .args(["--key", "alice/20240214T182500Z_abc.jpg", "--id", "r-1"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let receipt: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(receipt["id"], "r-1");
    assert_eq!(receipt["shop"], "Tesco");
    assert_eq!(receipt["user_id"], "alice");
    assert_eq!(receipt["source"], "20240214T182500Z_abc.jpg");
    assert_eq!(receipt["receipt_time"], "14/02/2024 18:22");

    let items: Vec<&str> = receipt["contents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["item"].as_str().unwrap())
        .collect();
    assert_eq!(items, vec!["Milk 2L", "Bread", "Bread", "Apples"]);
}

#[test]
fn process_vendor_name_fallback_as_csv() {
    let dir = tempdir().unwrap();
    tillroll(dir.path())
        .arg("process")
        .arg(fixture("deli.json"))
        .args(["--format", "csv", "--owner", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Joe's Deli,,Pastrami on rye,9.50,Pastrami,deli.json,bob"))
        .stdout(predicate::str::contains("Change").not());
}

#[test]
fn process_rejects_invalid_shape() {
    let dir = tempdir().unwrap();
    tillroll(dir.path())
        .arg("process")
        .arg(fixture("broken.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid input at $.ExpenseDocuments"));
}

#[test]
fn process_show_warnings() {
    let dir = tempdir().unwrap();
    tillroll(dir.path())
        .arg("process")
        .arg(fixture("tesco.json"))
        .args(["--format", "text", "--show-warnings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shop: Tesco"))
        .stderr(predicate::str::contains("matches noise phrase \"balance\""));
}

#[test]
fn process_with_custom_catalog() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("custom.json");
    fs::write(
        &config,
        r#"{"catalog": [{"pattern": "deli", "name": "Joe's"}]}"#,
    )
    .unwrap();

    let output = Command::cargo_bin("tillroll")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .arg("process")
        .arg(fixture("deli.json"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let receipt: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(receipt["shop"], "Joe's");
    assert_eq!(receipt["contents"][0]["merchant"], "Joe's");
}

#[test]
fn batch_writes_outputs_and_summary() {
    let input = tempdir().unwrap();
    fs::copy(fixture("tesco.json"), input.path().join("a.json")).unwrap();
    fs::copy(fixture("deli.json"), input.path().join("b.json")).unwrap();
    fs::copy(fixture("broken.json"), input.path().join("c.json")).unwrap();

    let out = tempdir().unwrap();
    let pattern = input.path().join("*.json");

    tillroll(out.path())
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(out.path())
        .args(["--summary", "--continue-on-error", "-j", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful"));

    assert!(out.path().join("a.json").exists());
    assert!(out.path().join("b.json").exists());
    assert!(!out.path().join("c.json").exists());

    let summary = fs::read_to_string(out.path().join("summary.csv")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("filename,status,id,shop"));
    assert!(lines[1].starts_with("a.json,success,"));
    assert!(lines[1].contains(",Tesco,14/02/2024 18:22,4,5.35,"));
    assert!(lines[2].starts_with("b.json,success,"));
    assert!(lines[3].starts_with("c.json,error,"));
}

#[test]
fn batch_stops_on_error_by_default() {
    let input = tempdir().unwrap();
    fs::copy(fixture("broken.json"), input.path().join("c.json")).unwrap();
    let pattern = input.path().join("*.json");

    let dir = tempdir().unwrap();
    tillroll(dir.path())
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn inspect_dumps_fields() {
    let dir = tempdir().unwrap();
    tillroll(dir.path())
        .arg("inspect")
        .arg(fixture("tesco.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("=== SummaryFields ==="))
        .stdout(predicate::str::contains("TRANSACTION_DATE"))
        .stdout(predicate::str::contains("ITEM=Price Saving | PRICE=£-0.50"))
        .stdout(predicate::str::contains("Detected merchant: Tesco"));
}

#[test]
fn config_path_reports_location() {
    let home = tempdir().unwrap();
    Command::cargo_bin("tillroll")
        .unwrap()
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"))
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn config_commands_use_given_file() {
    let home = tempdir().unwrap();
    let xdg = home.path().join("xdg");
    let config = home.path().join("mine.json");
    fs::write(&config, "{}").unwrap();

    let run = |args: &[&str]| {
        let mut cmd = Command::cargo_bin("tillroll").unwrap();
        cmd.env("HOME", home.path())
            .env("XDG_CONFIG_HOME", &xdg)
            .arg("-c")
            .arg(&config)
            .arg("config")
            .args(args);
        cmd
    };

    run(&["add-merchant", "joes", "Joe's"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added joes -> Joe's (20 catalog entries)"));

    run(&["get", "catalog.19.name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Joe's\""));

    run(&["set", "labels.vendor_name", "MERCHANT"])
        .assert()
        .success();

    run(&["get", "labels.vendor_name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"MERCHANT\""));

    run(&["path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mine.json"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config).unwrap()).unwrap();
    assert_eq!(saved["catalog"][19]["pattern"], "joes");
    assert_eq!(saved["labels"]["vendor_name"], "MERCHANT");
    assert!(!xdg.join("tillroll").join("config.json").exists());
}
