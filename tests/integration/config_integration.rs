//! Integration tests for layered configuration loading

use crate::integration::test_utils::with_env;
use gendux::config::ConfigLoader;
use tempfile::TempDir;

fn write_global_config(test_dir: &TempDir, content: &str) {
    let dir = test_dir.path().join("config").join("gendux");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), content).unwrap();
}

#[test]
fn test_defaults_without_any_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let config = with_env(&test_dir, &[], || ConfigLoader::load(workspace.path())).unwrap();
    assert_eq!(config.watch.interval_ms, 250);
    assert!(config.watch.persistent);
    assert!(config.compiler.enabled);
    assert_eq!(config.compiler.command, "tsc");
    assert_eq!(config.logging.output, "stderr");
}

#[test]
fn test_workspace_file_overrides_global_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_global_config(
        &test_dir,
        "[watch]\ninterval_ms = 500\n\n[compiler]\ncommand = \"npx tsc\"\n",
    );
    std::fs::write(
        workspace.path().join("gendux.toml"),
        "[watch]\ninterval_ms = 100\nsource_extensions = [\".ts\", \".tsx\"]\n",
    )
    .unwrap();

    let config = with_env(&test_dir, &[], || ConfigLoader::load(workspace.path())).unwrap();
    assert_eq!(config.watch.interval_ms, 100);
    assert_eq!(
        config.watch.source_extensions,
        vec![".ts".to_string(), ".tsx".to_string()]
    );
    assert_eq!(config.compiler.command, "npx tsc");
}

#[test]
fn test_environment_overrides_files() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    std::fs::write(
        workspace.path().join("gendux.toml"),
        "[compiler.options]\nmodule = \"es2015\"\n",
    )
    .unwrap();

    let config = with_env(
        &test_dir,
        &[("GENDUX__COMPILER__OPTIONS__MODULE", "amd")],
        || ConfigLoader::load(workspace.path()),
    )
    .unwrap();
    assert_eq!(config.compiler.options.module, "amd");
}

#[test]
fn test_invalid_values_fail_validation() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    std::fs::write(
        workspace.path().join("gendux.toml"),
        "[watch]\ninterval_ms = 0\n",
    )
    .unwrap();

    let config = with_env(&test_dir, &[], || ConfigLoader::load(workspace.path())).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("interval_ms"));
}
