//! CLI parse: clap types for gendux. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gendux CLI - entry-file generation and compile-on-change for action packets
#[derive(Parser)]
#[command(name = "gendux")]
#[command(about = "Generate the packet entry file from package.json and recompile on change")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (holds package.json)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the entry file, then regenerate and recompile on change
    Watch {
        /// Poll interval in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Stop after the startup pass
        #[arg(long)]
        once: bool,
        /// Skip the compiler service; only regenerate the entry file
        #[arg(long)]
        no_compile: bool,
    },
    /// Generate the entry file once
    Generate,
    /// Emit every root source file once
    Compile,
    /// Show the models and actions declared in package.json
    Inspect {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

impl Commands {
    /// Stable command name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Watch { .. } => "watch",
            Commands::Generate => "generate",
            Commands::Compile => "compile",
            Commands::Inspect { .. } => "inspect",
        }
    }
}
