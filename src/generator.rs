//! Entry-File Generator
//!
//! Renders the aggregating `src/index.ts` for a package: one import/re-export pair per
//! declared action and one `packet.action` registration call per action, wrapped in a
//! `packet(<name>, ...)` default export. The file is always fully regenerated.

use crate::error::{GenduxError, ManifestError};
use crate::manifest::{package_name, Manifest};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Module every generated entry file imports the composition root from.
pub const FRAMEWORK_MODULE: &str = "gendux";

/// Entry file location relative to the manifest directory.
pub const ENTRY_FILE: &str = "src/index.ts";

/// Quote a string as a JSON string literal, which is also a valid TS string literal.
fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Import/re-export fragment: one pair of statements per action.
pub fn render_imports(manifest: &Manifest) -> String {
    manifest
        .actions()
        .iter()
        .map(|(name, entry)| {
            let path = quote(&entry.path);
            format!(
                "export {{default as {name}}} from {path}\nimport {{default as {name}}} from {path}\n"
            )
        })
        .collect()
}

/// Registration fragment: one `packet.action` call per action.
pub fn render_registrations(manifest: &Manifest) -> String {
    manifest
        .actions()
        .keys()
        .map(|name| format!("    packet.action({}, {})\n", quote(name), name))
        .collect()
}

/// Compose the full entry module for `package`.
pub fn render_entry_module(manifest: &Manifest, package: &str) -> String {
    format!(
        "import {{packet}} from {framework}\n{imports}\nexport default packet({package}, packet => {{\n{registrations}}})\n",
        framework = quote(FRAMEWORK_MODULE),
        imports = render_imports(manifest),
        package = quote(package),
        registrations = render_registrations(manifest),
    )
}

/// Path of the entry file generated for the manifest at `manifest_path`.
pub fn entry_file_path(manifest_path: &Path) -> PathBuf {
    manifest_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(ENTRY_FILE)
}

/// Read the manifest, render the entry module, and overwrite the entry file.
///
/// Returns the path written.
pub fn generate_entry_file(manifest_path: &Path) -> Result<PathBuf, GenduxError> {
    let manifest = Manifest::load(manifest_path)?;
    let package = package_name(manifest_path)?;
    let entry_path = entry_file_path(manifest_path);
    let source = render_entry_module(&manifest, &package);

    debug!(
        manifest = %manifest_path.display(),
        actions = manifest.actions().len(),
        "Rendered entry module"
    );
    info!(entry = %entry_path.display(), "Writing the entry file...");

    if let Some(parent) = entry_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| GenduxError::WriteEntry {
            path: entry_path.clone(),
            source,
        })?;
    }
    std::fs::write(&entry_path, source).map_err(|source| GenduxError::WriteEntry {
        path: entry_path.clone(),
        source,
    })?;
    Ok(entry_path)
}

/// Check that the manifest exists before the first generation pass.
pub fn require_manifest(manifest_path: &Path) -> Result<(), ManifestError> {
    if manifest_path.is_file() {
        Ok(())
    } else {
        Err(ManifestError::NotFound(manifest_path.to_path_buf()))
    }
}
