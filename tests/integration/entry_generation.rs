//! Integration tests for the entry-file generator

use crate::integration::test_utils::workspace_with_manifest;
use gendux::error::{GenduxError, ManifestError};
use gendux::generator::{generate_entry_file, require_manifest};
use gendux::manifest::manifest_path;

const DEMO_ENTRY: &str = r#"import {packet} from "gendux"
export {default as addTodo} from "./addTodo"
import {default as addTodo} from "./addTodo"

export default packet("demo", packet => {
    packet.action("addTodo", addTodo)
})
"#;

#[test]
fn test_demo_manifest_renders_fixed_template() {
    let ws = workspace_with_manifest(
        r#"{"name":"demo","gendux":{"actions":{"addTodo":{"path":"./addTodo"}}}}"#,
    );
    let written = generate_entry_file(&manifest_path(ws.path())).unwrap();

    assert_eq!(written, ws.path().join("src").join("index.ts"));
    assert_eq!(std::fs::read_to_string(&written).unwrap(), DEMO_ENTRY);
}

#[test]
fn test_regeneration_is_byte_identical() {
    let ws = workspace_with_manifest(
        r#"{"name":"demo","gendux":{"models":{"todos":{"singleton":true}},
            "actions":{"remove":{"path":"./remove"},"add":{"path":"./add"}}}}"#,
    );
    let manifest = manifest_path(ws.path());

    let first = std::fs::read(generate_entry_file(&manifest).unwrap()).unwrap();
    let second = std::fs::read(generate_entry_file(&manifest).unwrap()).unwrap();
    assert_eq!(first, second);

    let text = String::from_utf8(first).unwrap();
    assert!(text.find("packet.action(\"add\"").unwrap() < text.find("packet.action(\"remove\"").unwrap());
    assert!(!text.contains("todos"), "models are not rendered");
}

#[test]
fn test_no_actions_renders_empty_registration_block() {
    let ws = workspace_with_manifest(r#"{"name":"empty"}"#);
    let written = generate_entry_file(&manifest_path(ws.path())).unwrap();

    assert_eq!(
        std::fs::read_to_string(written).unwrap(),
        "import {packet} from \"gendux\"\n\nexport default packet(\"empty\", packet => {\n})\n"
    );
}

#[test]
fn test_existing_entry_file_is_overwritten() {
    let ws = workspace_with_manifest(r#"{"name":"demo","gendux":{"actions":{"a":{"path":"./a"}}}}"#);
    std::fs::create_dir_all(ws.path().join("src")).unwrap();
    std::fs::write(ws.path().join("src/index.ts"), "// stale\n".repeat(50)).unwrap();

    let written = generate_entry_file(&manifest_path(ws.path())).unwrap();
    let text = std::fs::read_to_string(written).unwrap();
    assert!(!text.contains("stale"));
    assert!(text.ends_with("    packet.action(\"a\", a)\n})\n"));
}

#[test]
fn test_malformed_manifest_writes_nothing() {
    let ws = workspace_with_manifest(r#"{"name":"demo","gendux":{"actions":"#);
    let err = generate_entry_file(&manifest_path(ws.path())).unwrap_err();

    assert!(matches!(err, GenduxError::Manifest(ManifestError::Parse { .. })));
    assert!(err.to_string().contains("package.json"));
    assert!(!ws.path().join("src/index.ts").exists());
}

#[test]
fn test_missing_name_is_rejected() {
    let ws = workspace_with_manifest(r#"{"gendux":{"actions":{"a":{"path":"./a"}}}}"#);
    let err = generate_entry_file(&manifest_path(ws.path())).unwrap_err();
    assert!(matches!(err, GenduxError::Manifest(ManifestError::MissingName { .. })));
}

#[test]
fn test_invalid_action_key_is_rejected() {
    let ws = workspace_with_manifest(r#"{"name":"demo","gendux":{"actions":{"add-todo":{}}}}"#);
    let err = generate_entry_file(&manifest_path(ws.path())).unwrap_err();
    assert!(err.to_string().contains("add-todo"));
}

#[test]
fn test_require_manifest_names_missing_path() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = manifest_path(temp.path());
    let err = require_manifest(&path).unwrap_err();
    assert!(err.to_string().contains(&path.display().to_string()));
}
