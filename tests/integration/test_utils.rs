//! Shared test utilities for integration tests
//!
//! Workspace fixtures plus serialized access to the environment variables the
//! config loader reads, so tests that change them do not race.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Serializes every test that touches process environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    vars: Vec<(String, Option<String>)>,
}

impl EnvState {
    fn capture(names: &[&str]) -> Self {
        Self {
            vars: names
                .iter()
                .map(|name| (name.to_string(), std::env::var(name).ok()))
                .collect(),
        }
    }

    fn restore(self) {
        for (name, value) in self.vars {
            match value {
                Some(orig) => std::env::set_var(&name, orig),
                None => std::env::remove_var(&name),
            }
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointed into `test_dir`, plus any extra
/// variables in `vars`. Everything is restored afterwards.
pub fn with_env<F, R>(test_dir: &TempDir, vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let mut names = vec!["HOME", "XDG_CONFIG_HOME"];
    names.extend(vars.iter().map(|(name, _)| *name));
    let env_state = EnvState::capture(&names);

    let test_home = test_dir.path().join("home");
    let test_config_home = test_dir.path().join("config");
    std::fs::create_dir_all(&test_home).unwrap();
    std::fs::create_dir_all(&test_config_home).unwrap();

    std::env::set_var("HOME", &test_home);
    std::env::set_var("XDG_CONFIG_HOME", &test_config_home);
    for (name, value) in vars {
        std::env::set_var(name, value);
    }

    let result = f();

    env_state.restore();

    result
}

/// Workspace directory with a `package.json` holding `manifest`.
pub fn workspace_with_manifest(manifest: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    write_manifest(temp.path(), manifest);
    temp
}

pub fn write_manifest(dir: &Path, manifest: &str) -> PathBuf {
    let path = dir.join("package.json");
    std::fs::write(&path, manifest).unwrap();
    path
}

/// Push the modification time of `path` `secs` seconds into the future.
pub fn touch_later(path: &Path, secs: u64) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(std::time::SystemTime::now() + std::time::Duration::from_secs(secs))
        .unwrap();
}
