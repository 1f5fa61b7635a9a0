//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::compiler::{discover_sources, IncrementalCompiler, TscCompiler};
use crate::config::{ConfigLoader, GenduxConfig};
use crate::error::GenduxError;
use crate::generator::{entry_file_path, generate_entry_file, require_manifest};
use crate::manifest::{manifest_path, package_name, Manifest};
use crate::tooling::{WatchConfig, WatchDaemon};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_compile_summary, format_manifest_json, format_manifest_text, ManifestSummary,
};

/// Runtime context for CLI execution: workspace, config path, and loaded config.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config_path: Option<PathBuf>,
    config: GenduxConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, GenduxError> {
        let workspace_root = dunce::canonicalize(&workspace_root).map_err(|e| {
            GenduxError::ConfigError(format!(
                "Workspace {} is not accessible: {}",
                workspace_root.display(),
                e
            ))
        })?;

        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path).map_err(|e| {
                GenduxError::ConfigError(format!(
                    "Failed to load config from {}: {}",
                    cfg_path.display(),
                    e
                ))
            })?
        } else {
            ConfigLoader::load(&workspace_root)
                .map_err(|e| GenduxError::ConfigError(format!("Failed to load config: {}", e)))?
        };
        config.validate()?;

        Ok(Self {
            workspace_root,
            config_path,
            config,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn config(&self) -> &GenduxConfig {
        &self.config
    }

    fn manifest_path(&self) -> PathBuf {
        manifest_path(&self.workspace_root)
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, GenduxError> {
        debug!(command = command.name(), workspace = %self.workspace_root.display(), "Routing command");
        match command {
            Commands::Watch {
                interval_ms,
                once,
                no_compile,
            } => self.handle_watch(*interval_ms, *once, *no_compile),
            Commands::Generate => self.handle_generate(),
            Commands::Compile => self.handle_compile(),
            Commands::Inspect { format } => self.handle_inspect(format),
        }
    }

    fn handle_generate(&self) -> Result<String, GenduxError> {
        let manifest = self.manifest_path();
        require_manifest(&manifest)?;
        let written = generate_entry_file(&manifest)?;
        Ok(format!("Wrote {}", written.display()))
    }

    fn handle_compile(&self) -> Result<String, GenduxError> {
        let compiler = self.build_compiler()?.ok_or_else(|| {
            GenduxError::ConfigError("compiler.enabled is false".to_string())
        })?;
        let tracked = compiler.root_files().len();
        let reports = compiler.emit_all();
        Ok(format_compile_summary(&reports, tracked))
    }

    fn handle_inspect(&self, format: &str) -> Result<String, GenduxError> {
        let path = self.manifest_path();
        require_manifest(&path)?;
        let manifest = Manifest::load(&path)?;
        let package = package_name(&path)?;
        let summary = ManifestSummary::new(package, &path, entry_file_path(&path), &manifest);
        match format {
            "json" => format_manifest_json(&summary),
            "text" => Ok(format_manifest_text(&summary)),
            other => Err(GenduxError::ConfigError(format!(
                "Invalid format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }

    fn handle_watch(
        &self,
        interval_ms: Option<u64>,
        once: bool,
        no_compile: bool,
    ) -> Result<String, GenduxError> {
        let mut watch_config = WatchConfig::new(self.manifest_path());
        watch_config.source_files = self.root_sources();
        watch_config.interval_ms = interval_ms.unwrap_or(self.config.watch.interval_ms);
        watch_config.persistent = self.config.watch.persistent && !once;

        let compiler = if no_compile {
            None
        } else {
            self.build_compiler()?
        };

        let daemon = WatchDaemon::new(watch_config, compiler);
        info!("Starting watch mode daemon");
        daemon.start()?;
        Ok("Watch daemon stopped".to_string())
    }

    fn root_sources(&self) -> Vec<PathBuf> {
        discover_sources(&self.workspace_root, &self.config.watch.source_extensions)
    }

    /// `None` when the compiler is disabled in config.
    fn build_compiler(&self) -> Result<Option<IncrementalCompiler>, GenduxError> {
        let settings = &self.config.compiler;
        if !settings.enabled {
            return Ok(None);
        }
        let service = TscCompiler::new(settings.command.clone())?;
        Ok(Some(IncrementalCompiler::new(
            Box::new(service),
            settings.options.clone(),
            self.root_sources(),
        )))
    }
}
