//! Incremental Compiler Driver
//!
//! Keeps a version per root source file and asks a [`CompilerService`] for emit output
//! and diagnostics whenever a file changes. Emit failures are reported and logged with
//! 1-based diagnostic positions; they never stop the caller.

pub mod tsc;

pub use tsc::TscCompiler;

use crate::error::CompileError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Options forwarded to the compiler service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOptions {
    /// Module system for emitted code
    #[serde(default = "default_module")]
    pub module: String,

    /// Additional arguments passed through verbatim
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_module() -> String {
    "commonjs".to_string()
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            module: default_module(),
            extra_args: Vec::new(),
        }
    }
}

/// A root file and its change counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub name: PathBuf,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitOutput {
    pub emit_skipped: bool,
    pub output_files: Vec<OutputFile>,
}

/// Compiler diagnostic. Positions are 0-based; rendering adds 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: Option<PathBuf>,
    pub line: usize,
    pub character: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(
                f,
                "Error {} ({},{}): {}",
                file.display(),
                self.line + 1,
                self.character + 1,
                self.message
            ),
            None => write!(f, "Error: {}", self.message),
        }
    }
}

/// Compiler collaborator: an opaque incremental-compile oracle.
pub trait CompilerService: Send + Sync {
    fn emit(&self, file: &SourceFile, options: &CompilerOptions)
        -> Result<EmitOutput, CompileError>;

    fn diagnostics(
        &self,
        file: &SourceFile,
        options: &CompilerOptions,
    ) -> Result<Vec<Diagnostic>, CompileError>;
}

/// Outcome of compiling one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitReport {
    pub file: PathBuf,
    pub version: u64,
    pub emitted: bool,
    pub written: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct IncrementalCompiler {
    service: Box<dyn CompilerService>,
    options: CompilerOptions,
    versions: RwLock<BTreeMap<PathBuf, u64>>,
}

impl IncrementalCompiler {
    /// Track `root_files`, each starting at version 0.
    pub fn new(
        service: Box<dyn CompilerService>,
        options: CompilerOptions,
        root_files: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        let versions = root_files.into_iter().map(|path| (path, 0)).collect();
        Self {
            service,
            options,
            versions: RwLock::new(versions),
        }
    }

    pub fn root_files(&self) -> Vec<PathBuf> {
        self.versions.read().keys().cloned().collect()
    }

    pub fn version(&self, file: &Path) -> Option<u64> {
        self.versions.read().get(file).copied()
    }

    /// Emit every root file. Service errors are logged and skipped.
    pub fn emit_all(&self) -> Vec<EmitReport> {
        self.root_files()
            .into_iter()
            .filter_map(|file| match self.emit_file(&file) {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "Compiler service failed");
                    None
                }
            })
            .collect()
    }

    /// Record a change to `file` and emit it again.
    pub fn recompile(&self, file: &Path) -> Result<EmitReport, CompileError> {
        {
            let mut versions = self.versions.write();
            let version = versions.entry(file.to_path_buf()).or_insert(0);
            *version += 1;
        }
        self.emit_file(file)
    }

    /// Emit `file` at its current version and write the outputs.
    pub fn emit_file(&self, file: &Path) -> Result<EmitReport, CompileError> {
        let source = SourceFile {
            path: file.to_path_buf(),
            version: self.version(file).unwrap_or_default(),
        };
        let output = self.service.emit(&source, &self.options)?;

        let diagnostics = if output.emit_skipped {
            warn!("Emitting {} failed", file.display());
            let diagnostics = self.service.diagnostics(&source, &self.options)?;
            for diagnostic in &diagnostics {
                warn!("  {}", diagnostic);
            }
            diagnostics
        } else {
            info!("Emitting {}", file.display());
            Vec::new()
        };

        let mut written = Vec::with_capacity(output.output_files.len());
        for out in output.output_files {
            std::fs::write(&out.name, &out.text).map_err(|source| CompileError::WriteOutput {
                path: out.name.clone(),
                source,
            })?;
            written.push(out.name);
        }

        Ok(EmitReport {
            file: source.path,
            version: source.version,
            emitted: !output.emit_skipped,
            written,
            diagnostics,
        })
    }
}

/// Files directly inside `dir` whose names end in one of `extensions`, sorted.
pub fn discover_sources(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            extensions.iter().any(|ext| name.ends_with(ext.as_str()))
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}
