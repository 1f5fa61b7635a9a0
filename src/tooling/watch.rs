//! Watch Mode Daemon
//!
//! Long-lived process that polls the package manifest and the root source files. A
//! manifest whose modification time advances triggers a full entry-file regeneration;
//! an advanced source file is recompiled. Failures are logged and the daemon keeps
//! watching, so the next change retries.

use crate::compiler::{EmitReport, IncrementalCompiler};
use crate::error::GenduxError;
use crate::generator::{generate_entry_file, require_manifest};
use notify::{Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info, warn};

/// Watch mode configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Manifest (`package.json`) to regenerate from
    pub manifest_path: PathBuf,
    /// Root source files to recompile on change
    pub source_files: Vec<PathBuf>,
    /// Poll interval in milliseconds
    pub interval_ms: u64,
    /// Keep watching after the startup pass
    pub persistent: bool,
}

impl WatchConfig {
    pub fn new(manifest_path: PathBuf) -> Self {
        Self {
            manifest_path,
            source_files: Vec::new(),
            interval_ms: 250,
            persistent: true,
        }
    }
}

/// What a change event led to
#[derive(Debug)]
pub enum WatchOutcome {
    Regenerated(PathBuf),
    RegenerationFailed(String),
    Compiled(EmitReport),
    CompileFailed(String),
}

/// Remembers the last seen modification time per path.
#[derive(Debug, Default)]
pub struct MtimeTracker {
    seen: HashMap<PathBuf, SystemTime>,
}

impl MtimeTracker {
    fn modified(path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    /// Record the current modification time without reporting a change.
    pub fn record(&mut self, path: &Path) {
        if let Some(mtime) = Self::modified(path) {
            self.seen.insert(path.to_path_buf(), mtime);
        }
    }

    /// True when `path` was modified strictly after the last recorded time.
    /// A path never recorded counts as advanced if it exists.
    pub fn advanced(&mut self, path: &Path) -> bool {
        let Some(current) = Self::modified(path) else {
            return false;
        };
        match self.seen.get(path) {
            Some(previous) if current <= *previous => false,
            _ => {
                self.seen.insert(path.to_path_buf(), current);
                true
            }
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Watch mode daemon
pub struct WatchDaemon {
    manifest_path: PathBuf,
    source_files: Vec<PathBuf>,
    interval: Duration,
    persistent: bool,
    compiler: Option<IncrementalCompiler>,
    tracker: Mutex<MtimeTracker>,
    running: Arc<RwLock<bool>>,
}

impl WatchDaemon {
    /// Create a new watch daemon. `compiler` tracks the same root files as
    /// `config.source_files`; pass `None` to only regenerate the entry file.
    pub fn new(config: WatchConfig, compiler: Option<IncrementalCompiler>) -> Self {
        Self {
            manifest_path: normalize(&config.manifest_path),
            source_files: config.source_files.iter().map(|p| normalize(p)).collect(),
            interval: Duration::from_millis(config.interval_ms.max(1)),
            persistent: config.persistent,
            compiler,
            tracker: Mutex::new(MtimeTracker::default()),
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Shared flag; set to false to stop a running daemon.
    pub fn running_flag(&self) -> Arc<RwLock<bool>> {
        Arc::clone(&self.running)
    }

    pub fn stop(&self) {
        *self.running.write() = false;
    }

    /// Startup pass: emit every source, require the manifest, generate once.
    ///
    /// A missing manifest is fatal; a failed generation is logged and left for the
    /// next manifest change to retry.
    pub fn startup(&self) -> Result<Option<PathBuf>, GenduxError> {
        if let Some(compiler) = &self.compiler {
            let reports = compiler.emit_all();
            debug!(files = reports.len(), "Initial emit finished");
        }

        require_manifest(&self.manifest_path)?;

        {
            let mut tracker = self.tracker.lock();
            tracker.record(&self.manifest_path);
            for file in &self.source_files {
                tracker.record(file);
            }
        }

        match self.regenerate() {
            WatchOutcome::Regenerated(path) => Ok(Some(path)),
            _ => Ok(None),
        }
    }

    fn regenerate(&self) -> WatchOutcome {
        match generate_entry_file(&self.manifest_path) {
            Ok(path) => WatchOutcome::Regenerated(path),
            Err(e) => {
                error!(manifest = %self.manifest_path.display(), "{}", e);
                WatchOutcome::RegenerationFailed(e.to_string())
            }
        }
    }

    /// Dispatch a change notification for `path`. Returns `None` when the path is not
    /// watched or its modification time has not advanced.
    pub fn handle_change(&self, path: &Path) -> Option<WatchOutcome> {
        let path = normalize(path);
        let is_manifest = path == self.manifest_path;
        let is_source = self.source_files.contains(&path);
        if !is_manifest && !is_source {
            return None;
        }
        if !self.tracker.lock().advanced(&path) {
            return None;
        }

        if is_manifest {
            info!(manifest = %path.display(), "Manifest changed");
            return Some(self.regenerate());
        }

        let compiler = self.compiler.as_ref()?;
        Some(match compiler.recompile(&path) {
            Ok(report) => WatchOutcome::Compiled(report),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Compiler service failed");
                WatchOutcome::CompileFailed(e.to_string())
            }
        })
    }

    /// Run the startup pass, then poll until stopped (persistent mode only).
    pub fn start(&self) -> Result<(), GenduxError> {
        *self.running.write() = true;
        self.startup()?;

        if !self.persistent {
            info!("Startup pass finished, not persistent");
            *self.running.write() = false;
            return Ok(());
        }

        let (tx, rx) = mpsc::channel();
        let mut watcher = PollWatcher::new(
            move |res: notify::Result<Event>| {
                if let Err(e) = tx.send(res) {
                    error!("Error sending watch event: {}", e);
                }
            },
            notify::Config::default().with_poll_interval(self.interval),
        )?;

        watcher.watch(&self.manifest_path, RecursiveMode::NonRecursive)?;
        for file in &self.source_files {
            watcher.watch(file, RecursiveMode::NonRecursive)?;
        }
        info!(
            manifest = %self.manifest_path.display(),
            sources = self.source_files.len(),
            interval_ms = self.interval.as_millis() as u64,
            "Watching for changes"
        );

        while *self.running.read() {
            match rx.recv_timeout(self.interval) {
                Ok(Ok(event)) => self.process_event(event),
                Ok(Err(e)) => warn!("Watch error: {}", e),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    error!("Watcher channel disconnected");
                    break;
                }
            }
        }

        Ok(())
    }

    fn process_event(&self, event: Event) {
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return;
        }
        for path in &event.paths {
            if let Some(outcome) = self.handle_change(path) {
                debug!(?outcome, "Change handled");
            }
        }
    }
}
