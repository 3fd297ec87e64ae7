use assert_cmd::Command as AssertCommand;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Documents written to a scratch directory, plus an isolated config home.
struct Fixture {
    temp: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            temp: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp.path().join(name);
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    fn config_home(&self) -> PathBuf {
        let dir = self.temp.path().join("config");
        fs::create_dir_all(&dir).expect("Failed to create config dir");
        dir
    }

    fn run(&self, args: &[&str]) -> Output {
        let home = self.config_home();
        Command::new(env!("CARGO_BIN_EXE_rcheck"))
            .args(args)
            .env("XDG_CONFIG_HOME", &home)
            .env("APPDATA", &home)
            .env("HOME", &home)
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to run rcheck")
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("non utf-8 temp path")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout not utf-8")
}

#[test]
fn test_diff_equal_documents() {
    let fx = Fixture::new();
    let left = fx.write("left.json", r#"{"a": 1, "b": [true, null]}"#);
    let right = fx.write("right.json", r#"{"b": [true, null], "a": 1}"#);

    let output = fx.run(&["diff", path_str(&left), path_str(&right)]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_diff_reports_mismatch() {
    let fx = Fixture::new();
    let left = fx.write("left.json", r#"{"a": 1}"#);
    let right = fx.write("right.json", r#"{"a": 2}"#);

    let output = fx.run(&["diff", path_str(&left), path_str(&right)]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "expected values to be equal:\n  trail: map[\"a\"]\n   want: 1\n   have: 2\n"
    );
}

#[test]
fn test_diff_trail_prefix_and_skip() {
    let fx = Fixture::new();
    let left = fx.write("left.json", r#"{"id": 1, "name": "x"}"#);
    let right = fx.write("right.json", r#"{"id": 2, "name": "x"}"#);

    let output = fx.run(&["diff", path_str(&left), path_str(&right), "--trail", "doc"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("trail: doc[\"id\"]"));

    let output = fx.run(&[
        "diff",
        path_str(&left),
        path_str(&right),
        "--trail",
        "doc",
        "--skip-trail",
        "doc[\"id\"]",
    ]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_diff_json_report_sorted() {
    let fx = Fixture::new();
    let left = fx.write("left.json", r#"{"z": 1, "a": [1, 2], "m": "x"}"#);
    let right = fx.write("right.json", r#"{"z": 2, "a": [1, 3], "m": "y"}"#);

    let output = fx.run(&["diff", path_str(&left), path_str(&right), "--json", "--sort"]);
    assert_eq!(output.status.code(), Some(1));

    let report: Value = serde_json::from_str(&stdout(&output)).expect("invalid json output");
    assert_eq!(report["equal"], Value::Bool(false));
    let trails: Vec<&str> = report["notices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["trail"].as_str().unwrap())
        .collect();
    assert_eq!(trails, vec!["map[\"a\"][1]", "map[\"m\"]", "map[\"z\"]"]);
}

#[test]
fn test_diff_invalid_json_is_an_error() {
    let fx = Fixture::new();
    let left = fx.write("left.json", "{");
    let right = fx.write("right.json", "{}");

    let output = fx.run(&["diff", path_str(&left), path_str(&right)]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid JSON"));
}

#[test]
fn test_dump_flat_and_compact() {
    let fx = Fixture::new();
    let doc = fx.write("doc.json", r#"{"b": null, "a": [1, "x"]}"#);

    let output = fx.run(&["dump", path_str(&doc), "--flat"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        "Map<String, Value>{\"a\": Vec<Value>{1, \"x\"}, \"b\": nil}\n"
    );

    let output = fx.run(&["dump", path_str(&doc), "--compact"]);
    assert_eq!(
        stdout(&output),
        "Map<String, Value>{\"a\":Vec<Value>{1,\"x\"},\"b\":nil}\n"
    );
}

#[test]
fn test_dump_uses_settings_file() {
    let fx = Fixture::new();
    let doc = fx.write("doc.json", r#"{"a": {"b": {"c": 1}}}"#);
    let config = fx.write("rcheck.toml", "[dump]\nflat = true\nprint_type = false\nmax_depth = 1\n");

    let output = fx.run(&["dump", path_str(&doc), "--config", path_str(&config)]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "{\"a\": {\"b\": <...>}}\n");
}

#[test]
fn test_missing_file_exit_code() {
    let fx = Fixture::new();
    let home = fx.config_home();
    AssertCommand::cargo_bin("rcheck")
        .expect("binary not built")
        .args(["dump", "does-not-exist.json"])
        .env("XDG_CONFIG_HOME", &home)
        .env("HOME", &home)
        .assert()
        .code(2);
}
