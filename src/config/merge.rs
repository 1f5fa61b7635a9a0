//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("watch.interval_ms", 250)?
        .set_default("watch.persistent", true)?
        .set_default("compiler.command", "tsc")?
        .set_default("compiler.options.module", "commonjs")
}
