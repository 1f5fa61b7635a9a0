//! gendux: packet entry-file generation and context-bound actions
//!
//! Two halves share this crate. The build side reads the `gendux` section of a
//! `package.json` and writes the packet entry module, regenerating it (and
//! recompiling root sources) while watching. The runtime side wraps resumable
//! action bodies so every resumption runs with the context captured at invocation
//! installed as the ambient context.

pub mod action;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod logging;
pub mod manifest;
pub mod packet;
pub mod tooling;

pub use action::{action, Action, ContextBound};
pub use context::{create_context, current_context, run_with_context, Context};
pub use packet::{packet, Packet};
