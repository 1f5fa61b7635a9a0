//! Integration tests for gendux entry generation, watch mode, and context-bound actions

mod cli_binary;
mod config_integration;
mod entry_generation;
mod test_utils;
mod watch_daemon;
