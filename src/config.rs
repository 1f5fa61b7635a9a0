//! Configuration System
//!
//! Layered configuration for the gendux CLI: built-in defaults, the global
//! `$XDG_CONFIG_HOME/gendux/config.toml`, the workspace `gendux.toml`, then
//! `GENDUX__SECTION__KEY` environment variables.

use crate::compiler::CompilerOptions;
use crate::error::GenduxError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenduxConfig {
    /// File watching settings
    #[serde(default)]
    pub watch: WatchSettings,

    /// Compiler service settings
    #[serde(default)]
    pub compiler: CompilerSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Watcher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSettings {
    /// Poll interval in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Keep watching after the startup pass
    #[serde(default = "default_true")]
    pub persistent: bool,

    /// File name suffixes of root source files
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
}

fn default_interval_ms() -> u64 {
    250
}

fn default_true() -> bool {
    true
}

fn default_source_extensions() -> Vec<String> {
    vec![".ts".to_string()]
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            persistent: default_true(),
            source_extensions: default_source_extensions(),
        }
    }
}

/// Compiler service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerSettings {
    /// Compile changed sources at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Compiler executable
    #[serde(default = "default_compiler_command")]
    pub command: String,

    #[serde(default)]
    pub options: CompilerOptions,
}

fn default_compiler_command() -> String {
    "tsc".to_string()
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            command: default_compiler_command(),
            options: CompilerOptions::default(),
        }
    }
}

impl GenduxConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), GenduxError> {
        let mut errors = Vec::new();

        if self.watch.interval_ms == 0 {
            errors.push("watch.interval_ms must be greater than zero".to_string());
        }
        if self.watch.source_extensions.iter().any(|ext| ext.is_empty()) {
            errors.push("watch.source_extensions cannot contain empty entries".to_string());
        }
        if self.compiler.enabled && self.compiler.command.trim().is_empty() {
            errors.push("compiler.command cannot be empty".to_string());
        }
        if self.compiler.options.module.trim().is_empty() {
            errors.push("compiler.options.module cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(GenduxError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            )))
        }
    }
}
