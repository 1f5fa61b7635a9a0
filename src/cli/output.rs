//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{GenduxError, ManifestError};

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &GenduxError) -> String {
    match e {
        GenduxError::Manifest(ManifestError::NotFound(_)) => {
            format!("{} (run from the package root or pass --workspace)", e)
        }
        other => other.to_string(),
    }
}
