//! `tsc` adapter for [`CompilerService`].
//!
//! Runs the TypeScript compiler once per changed file. `tsc` writes its own outputs next
//! to the source, so [`EmitOutput::output_files`] is always empty. A non-zero exit alone
//! does not mean the emit was skipped: `tsc` still writes JavaScript for files with type
//! errors unless `--noEmitOnError` is given, so the emit only counts as skipped when that
//! flag is set or the expected output was not rewritten. Diagnostics come from the
//! `--pretty false` text format, `file(line,col): error TSnnnn: message`.

use super::{CompilerOptions, CompilerService, Diagnostic, EmitOutput, SourceFile};
use crate::error::CompileError;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;
use tracing::debug;

/// Parses `tsc --pretty false` output
pub struct DiagnosticParser {
    located: Regex,
    global: Regex,
}

impl DiagnosticParser {
    pub fn new() -> Result<Self, CompileError> {
        Ok(Self {
            located: Regex::new(
                r"^(?P<file>.+?)\((?P<line>\d+),(?P<col>\d+)\): error TS\d+: (?P<message>.*)$",
            )?,
            global: Regex::new(r"^error TS\d+: (?P<message>.*)$")?,
        })
    }

    /// Extract diagnostics, converting tsc's 1-based positions to 0-based.
    pub fn parse(&self, output: &str) -> Vec<Diagnostic> {
        output
            .lines()
            .filter_map(|line| {
                let line = line.trim_end();
                if let Some(caps) = self.located.captures(line) {
                    let position = |name: &str| {
                        caps[name]
                            .parse::<usize>()
                            .unwrap_or(1)
                            .saturating_sub(1)
                    };
                    return Some(Diagnostic {
                        file: Some(PathBuf::from(&caps["file"])),
                        line: position("line"),
                        character: position("col"),
                        message: caps["message"].to_string(),
                    });
                }
                self.global.captures(line).map(|caps| Diagnostic {
                    file: None,
                    line: 0,
                    character: 0,
                    message: caps["message"].to_string(),
                })
            })
            .collect()
    }
}

pub struct TscCompiler {
    command: String,
    parser: DiagnosticParser,
    last_output: Mutex<HashMap<PathBuf, String>>,
}

impl TscCompiler {
    pub fn new(command: impl Into<String>) -> Result<Self, CompileError> {
        Ok(Self {
            command: command.into(),
            parser: DiagnosticParser::new()?,
            last_output: Mutex::new(HashMap::new()),
        })
    }

    fn run(
        &self,
        file: &SourceFile,
        options: &CompilerOptions,
        no_emit: bool,
    ) -> Result<(bool, String), CompileError> {
        let mut command = Command::new(&self.command);
        command
            .arg("--module")
            .arg(&options.module)
            .arg("--pretty")
            .arg("false")
            .args(&options.extra_args);
        if no_emit {
            command.arg("--noEmit");
        }
        command.arg(&file.path);

        debug!(command = %self.command, file = %file.path.display(), version = file.version, "Running compiler");
        let output = command.output().map_err(|source| CompileError::Spawn {
            command: self.command.clone(),
            source,
        })?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok((output.status.success(), text))
    }
}

/// Where `tsc` writes the JavaScript for `source`, unless the options redirect output.
fn expected_output(source: &Path, options: &CompilerOptions) -> Option<PathBuf> {
    let redirected = options
        .extra_args
        .iter()
        .any(|arg| matches!(arg.as_str(), "--outDir" | "--outFile" | "--out"));
    (!redirected).then(|| source.with_extension("js"))
}

fn no_emit_on_error(options: &CompilerOptions) -> bool {
    let args = &options.extra_args;
    args.iter().enumerate().any(|(i, arg)| {
        arg == "--noEmitOnError" && args.get(i + 1).map(String::as_str) != Some("false")
    })
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// `output_written` is `None` when the output location is unknown.
fn emit_skipped(success: bool, no_emit_on_error: bool, output_written: Option<bool>) -> bool {
    if success {
        return false;
    }
    if no_emit_on_error {
        return true;
    }
    output_written.map_or(false, |written| !written)
}

impl CompilerService for TscCompiler {
    fn emit(
        &self,
        file: &SourceFile,
        options: &CompilerOptions,
    ) -> Result<EmitOutput, CompileError> {
        let output = expected_output(&file.path, options);
        let before = output.as_deref().and_then(modified);
        let (success, text) = self.run(file, options, false)?;
        let written = output.as_deref().map(|path| {
            let after = modified(path);
            after.is_some() && after != before
        });

        let skipped = emit_skipped(success, no_emit_on_error(options), written);
        let mut last_output = self.last_output.lock();
        if skipped {
            last_output.insert(file.path.clone(), text);
        } else {
            last_output.remove(&file.path);
        }
        Ok(EmitOutput {
            emit_skipped: skipped,
            output_files: Vec::new(),
        })
    }

    fn diagnostics(
        &self,
        file: &SourceFile,
        options: &CompilerOptions,
    ) -> Result<Vec<Diagnostic>, CompileError> {
        let cached = self.last_output.lock().remove(&file.path);
        let text = match cached {
            Some(text) => text,
            None => self.run(file, options, true)?.1,
        };
        Ok(self.parser.parse(&text))
    }
}
