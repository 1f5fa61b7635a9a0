//! Config loading facade: merges every source in precedence order.

use super::merge::builder_with_defaults;
use super::sources::{global_file, workspace_file};
use super::GenduxConfig;
use config::{ConfigError, Environment, File};
use std::path::Path;

/// Environment variable prefix; nested keys use `__`, e.g. `GENDUX__WATCH__INTERVAL_MS`.
pub const ENV_PREFIX: &str = "GENDUX";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config for a workspace: defaults, global file, workspace file, environment.
    pub fn load(workspace_root: &Path) -> Result<GenduxConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Load config from one explicit file, ignoring the global and workspace files.
    pub fn load_from_file(path: &Path) -> Result<GenduxConfig, ConfigError> {
        builder_with_defaults()?
            .add_source(File::from(path))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }
}
