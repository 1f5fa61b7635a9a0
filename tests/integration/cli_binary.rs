//! Integration tests that run the gendux binary

use crate::integration::test_utils::workspace_with_manifest;
use std::process::{Command, Output};

fn gendux(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gendux"))
        .args(args)
        .env("GENDUX_LOG", "off")
        .output()
        .unwrap()
}

#[test]
fn test_generate_command_writes_entry_file() {
    let ws = workspace_with_manifest(
        r#"{"name":"demo","gendux":{"actions":{"addTodo":{"path":"./addTodo"}}}}"#,
    );
    let out = gendux(&["--workspace", ws.path().to_str().unwrap(), "generate"]);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("Wrote "));
    let entry = std::fs::read_to_string(ws.path().join("src/index.ts")).unwrap();
    assert!(entry.starts_with("import {packet} from \"gendux\"\n"));
}

#[test]
fn test_missing_manifest_exits_nonzero() {
    let temp = tempfile::TempDir::new().unwrap();
    let out = gendux(&["--workspace", temp.path().to_str().unwrap(), "generate"]);

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("package.json"), "stderr: {}", stderr);
}

#[test]
fn test_inspect_json_output() {
    let ws = workspace_with_manifest(
        r#"{"name":"demo","gendux":{"models":{"todos":{"path":"./todos","singleton":true}},"actions":{"addTodo":{"path":"./addTodo"}}}}"#,
    );
    let out = gendux(&[
        "--workspace",
        ws.path().to_str().unwrap(),
        "inspect",
        "--format",
        "json",
    ]);

    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["package"], "demo");
    assert_eq!(value["models"][0]["singleton"], true);
    assert_eq!(value["actions"][0]["path"], "./addTodo");
}

#[test]
fn test_watch_once_without_compiler() {
    let ws = workspace_with_manifest(r#"{"name":"demo"}"#);
    let out = gendux(&[
        "--workspace",
        ws.path().to_str().unwrap(),
        "watch",
        "--once",
        "--no-compile",
    ]);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(ws.path().join("src/index.ts").exists());
}
