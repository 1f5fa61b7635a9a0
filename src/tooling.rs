//! Tooling & Integration Layer
//!
//! Long-running integrations around the generator and the compiler driver.

pub mod watch;

pub use watch::{MtimeTracker, WatchConfig, WatchDaemon, WatchOutcome};
