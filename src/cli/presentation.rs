//! CLI presentation: text and json formatters per command.

use crate::compiler::EmitReport;
use crate::error::GenduxError;
use crate::manifest::Manifest;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What `inspect` reports about a workspace manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestSummary {
    pub package: String,
    pub manifest_path: PathBuf,
    pub entry_file: PathBuf,
    pub models: Vec<ModelRow>,
    pub actions: Vec<ActionRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelRow {
    pub name: String,
    pub path: String,
    pub singleton: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionRow {
    pub name: String,
    pub path: String,
}

impl ManifestSummary {
    pub fn new(package: String, manifest_path: &Path, entry_file: PathBuf, manifest: &Manifest) -> Self {
        Self {
            package,
            manifest_path: manifest_path.to_path_buf(),
            entry_file,
            models: manifest
                .models()
                .iter()
                .map(|(name, entry)| ModelRow {
                    name: name.clone(),
                    path: entry.path.clone(),
                    singleton: entry.singleton,
                })
                .collect(),
            actions: manifest
                .actions()
                .iter()
                .map(|(name, entry)| ActionRow {
                    name: name.clone(),
                    path: entry.path.clone(),
                })
                .collect(),
        }
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "-".to_string()
    } else {
        path.to_string()
    }
}

pub fn format_manifest_text(summary: &ManifestSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Package: {}\n", summary.package));
    out.push_str(&format!("Manifest: {}\n", summary.manifest_path.display()));
    out.push_str(&format!("Entry file: {}\n\n", summary.entry_file.display()));

    out.push_str("Models\n\n");
    if summary.models.is_empty() {
        out.push_str("  (none)\n\n");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Name", "Path", "Singleton"]);
        for row in &summary.models {
            table.add_row(vec![
                row.name.clone(),
                display_path(&row.path),
                if row.singleton { "yes" } else { "no" }.to_string(),
            ]);
        }
        out.push_str(&format!("{}\n\n", table));
    }

    out.push_str("Actions\n\n");
    if summary.actions.is_empty() {
        out.push_str("  (none)");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Name", "Path"]);
        for row in &summary.actions {
            table.add_row(vec![row.name.clone(), display_path(&row.path)]);
        }
        out.push_str(&format!("{}", table));
    }
    out
}

pub fn format_manifest_json(summary: &ManifestSummary) -> Result<String, GenduxError> {
    serde_json::to_string_pretty(summary).map_err(|e| GenduxError::Io(e.into()))
}

/// One line per emitted file followed by its diagnostics.
pub fn format_compile_summary(reports: &[EmitReport], tracked: usize) -> String {
    if tracked == 0 {
        return "No root source files found".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["File", "Version", "Status", "Diagnostics"]);
    for report in reports {
        table.add_row(vec![
            report.file.display().to_string(),
            report.version.to_string(),
            if report.emitted { "emitted" } else { "failed" }.to_string(),
            report.diagnostics.len().to_string(),
        ]);
    }

    let failed = reports.iter().filter(|r| !r.emitted).count();
    let mut out = format!("{}\n", table);
    for report in reports.iter().filter(|r| !r.diagnostics.is_empty()) {
        for diagnostic in &report.diagnostics {
            out.push_str(&format!("{}\n", diagnostic));
        }
    }
    out.push_str(&format!(
        "{} of {} file(s) emitted, {} failed, {} not reached",
        reports.len() - failed,
        tracked,
        failed,
        tracked.saturating_sub(reports.len())
    ));
    out
}
