//! CLI dispatch through the real binary.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_bedwatch")
}

fn unique_temp_path(name: &str, extension: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("bedwatch-{name}-{stamp}.{extension}"))
}

const FIXTURE_ROWS: &str = r#"[
  {
    "timestamp": "01/05/2021 11:30:00",
    "hospitalname": "General Hospital",
    "zone": "EAST",
    "pincode": "560001",
    "phonenumber": "080-1111",
    "generalbeds": "4",
    "hdubeds": "1",
    "icubeds": "-",
    "icuventilatorbeds": "0",
    "remarks": "call ahead",
    "type": "Government",
    "interested": "Yes"
  },
  {
    "timestamp": "01/05/2021 10:20:00",
    "hospitalname": "Westside Clinic",
    "zone": "WEST",
    "pincode": "560099",
    "phonenumber": "080-4444",
    "generalbeds": "9",
    "hdubeds": "2",
    "icubeds": "1",
    "icuventilatorbeds": "1",
    "remarks": "",
    "type": "Government",
    "interested": "No"
  }
]"#;

struct Fixture {
    rows_path: PathBuf,
    state_path: PathBuf,
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.rows_path);
        let _ = fs::remove_file(&self.state_path);
    }
}

fn write_fixture(name: &str) -> Fixture {
    let rows_path = unique_temp_path(&format!("{name}-rows"), "json");
    fs::write(&rows_path, FIXTURE_ROWS).expect("fixture rows should write");
    let state_path = unique_temp_path(&format!("{name}-state"), "json");
    Fixture {
        rows_path,
        state_path,
    }
}

fn file_source_command(fixture: &Fixture) -> Command {
    let mut command = Command::new(bin());
    command
        .env("BEDWATCH_SOURCE", "file")
        .env("BEDWATCH_SOURCE_PATH", &fixture.rows_path)
        .env("BEDWATCH_STATE_PATH", &fixture.state_path);
    command
}

#[test]
fn missing_command_prints_usage_and_exits_2() {
    let output = Command::new(bin()).output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: bedwatch"));
}

#[test]
fn unknown_command_prints_usage_and_exits_2() {
    let output = Command::new(bin())
        .arg("simulate")
        .output()
        .expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn query_command_renders_a_zone_report() {
    let fixture = write_fixture("cli-query");
    let output = file_source_command(&fixture)
        .args(["query", "zone", "EAST"])
        .output()
        .expect("query should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("*General Hospital*"));
    assert!(stdout.contains("General Beds: 4"));
}

#[test]
fn query_command_without_value_prints_usage() {
    let fixture = write_fixture("cli-query-usage");
    let output = file_source_command(&fixture)
        .args(["query", "zone"])
        .output()
        .expect("query should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: bedwatch query"));
}

#[test]
fn fetch_command_prints_the_refresh_summary() {
    let fixture = write_fixture("cli-fetch");
    let output = file_source_command(&fixture)
        .arg("fetch")
        .output()
        .expect("fetch should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fetch complete: rows=2, retained=1"));
    assert!(stdout.contains("dropped_not_interested=1"));
    assert!(fixture.state_path.exists(), "fetch persists freshness state");
}

#[test]
fn export_command_writes_a_csv_file() {
    let fixture = write_fixture("cli-export");
    let export_path = unique_temp_path("cli-export-out", "csv");
    let output = file_source_command(&fixture)
        .arg("export")
        .arg(&export_path)
        .output()
        .expect("export should run");

    assert_eq!(output.status.code(), Some(0));
    let contents = fs::read_to_string(&export_path).expect("export file should exist");
    assert!(contents.starts_with("hospital,zone,pincode"));
    assert!(contents.contains("General Hospital"));
    assert!(!contents.contains("Westside Clinic"), "declined rows are dropped");

    let _ = fs::remove_file(&export_path);
}

#[test]
fn file_source_without_a_path_fails_cleanly() {
    let fixture = write_fixture("cli-no-path");
    let output = Command::new(bin())
        .env("BEDWATCH_SOURCE", "file")
        .env("BEDWATCH_STATE_PATH", &fixture.state_path)
        .env_remove("BEDWATCH_SOURCE_PATH")
        .args(["query", "zone", "EAST"])
        .output()
        .expect("query should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("BEDWATCH_SOURCE_PATH"));
}
