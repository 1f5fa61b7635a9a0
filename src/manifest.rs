//! Manifest loading
//!
//! Reads the `gendux` section and the package `name` out of a `package.json`.
//! Missing fields take documented defaults; a field of the wrong JSON type fails
//! the whole load so malformed manifests are rejected before any code is rendered.

use crate::error::ManifestError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Declared model entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Module path of the model implementation (default: empty)
    #[serde(default)]
    pub path: String,

    /// Whether a single shared instance is created (default: false)
    #[serde(default)]
    pub singleton: bool,
}

/// Declared action entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    /// Module path of the action implementation (default: empty)
    #[serde(default)]
    pub path: String,
}

/// The `gendux` section of a manifest.
///
/// Keys enumerate in sorted order, so rendering is deterministic for a given manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenduxSection {
    #[serde(default, deserialize_with = "entries")]
    pub models: BTreeMap<String, ModelEntry>,

    #[serde(default, deserialize_with = "entries")]
    pub actions: BTreeMap<String, ActionEntry>,
}

/// A parsed `package.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Package identity used as the packet name
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub gendux: GenduxSection,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Map whose entries may be `null`; a `null` entry takes the entry defaults.
fn entries<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let raw: Option<BTreeMap<String, Option<T>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, entry)| (key, entry.unwrap_or_default()))
        .collect())
}

impl Manifest {
    /// Load and validate the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::parse(&content, path)?;
        manifest.validate(path)?;
        Ok(manifest)
    }

    /// Parse manifest text. `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, ManifestError> {
        let parsed: Option<Manifest> =
            serde_json::from_str(content).map_err(|source| ManifestError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;
        Ok(parsed.unwrap_or_default())
    }

    /// Reject action keys that cannot be emitted as bindings.
    pub fn validate(&self, origin: &Path) -> Result<(), ManifestError> {
        for name in self.gendux.actions.keys() {
            if !is_identifier(name) {
                return Err(ManifestError::InvalidActionName {
                    path: origin.to_path_buf(),
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn actions(&self) -> &BTreeMap<String, ActionEntry> {
        &self.gendux.actions
    }

    pub fn models(&self) -> &BTreeMap<String, ModelEntry> {
        &self.gendux.models
    }
}

/// Read the package name from the root `name` field of the manifest at `path`.
pub fn package_name(path: &Path) -> Result<String, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    document
        .get("name")
        .and_then(|name| name.as_str())
        .map(str::to_string)
        .ok_or_else(|| ManifestError::MissingName {
            path: path.to_path_buf(),
        })
}

/// Manifest location for a workspace directory.
pub fn manifest_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join("package.json")
}

const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "yield", "let", "static",
    "implements", "interface", "package", "private", "protected", "public", "await",
];

const ZWNJ: char = '\u{200C}';
const ZWJ: char = '\u{200D}';

/// ECMAScript identifier check. Letters and digits are Unicode alphabetic/alphanumeric,
/// which approximates `ID_Start`/`ID_Continue` without escape sequences.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let first_ok = match chars.next() {
        Some(c) => c.is_alphabetic() || c == '_' || c == '$',
        None => false,
    };
    first_ok
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | ZWNJ | ZWJ))
        && !RESERVED_WORDS.contains(&name)
}
