//! Error types for gendux entry generation and action dispatch.

use std::path::PathBuf;
use thiserror::Error;

/// Manifest read errors. Every variant names the manifest path that failed.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Error while reading gendux manifest from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error while parsing gendux manifest from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error while getting package name from {path}: no string `name` at the document root")]
    MissingName { path: PathBuf },

    #[error("Action name {name:?} in {path} is not a valid identifier")]
    InvalidActionName { path: PathBuf, name: String },

    #[error("Could not find any JSON file at {0}")]
    NotFound(PathBuf),
}

/// Ambient context errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("Could not get context: no context is active")]
    Missing,
}

/// Composition root errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error(
        "Function name {actual} differs from the name {expected} provided in package.json; \
         update either the function or package.json to make them match"
    )]
    NameMismatch { expected: String, actual: String },

    #[error("Action not registered in packet {packet}: {action}")]
    UnknownAction { packet: String, action: String },

    #[error("Packet not installed in context: {0}")]
    UnknownPacket(String),

    #[error("Packet already installed in context: {0}")]
    DuplicatePacket(String),
}

/// Errors raised while starting or resuming an action
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Packet(#[from] PacketError),

    #[error("Invalid params for action {action}: field `{field}` expected {expected}")]
    InvalidParams {
        action: String,
        field: String,
        expected: String,
    },

    #[error("Invalid output for action {action}: expected {expected}")]
    InvalidOutput { action: String, expected: String },

    #[error("Action failed: {0}")]
    Failed(String),
}

/// Compiler service errors
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Failed to run compiler `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid diagnostic pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to write emitted file {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error surfaced by the CLI and the watch daemon
#[derive(Debug, Error)]
pub enum GenduxError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Packet(#[from] PacketError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("Failed to write entry file {path}: {source}")]
    WriteEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Watch error: {0}")]
    Watch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for GenduxError {
    fn from(err: config::ConfigError) -> Self {
        GenduxError::ConfigError(err.to_string())
    }
}

impl From<notify::Error> for GenduxError {
    fn from(err: notify::Error) -> Self {
        GenduxError::Watch(err.to_string())
    }
}
