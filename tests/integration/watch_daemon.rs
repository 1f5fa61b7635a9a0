//! Integration tests for watch mode: startup pass, mtime-gated dispatch, recovery

use crate::integration::test_utils::{touch_later, write_manifest};
use gendux::compiler::{
    CompilerOptions, CompilerService, Diagnostic, EmitOutput, IncrementalCompiler, OutputFile,
    SourceFile,
};
use gendux::error::CompileError;
use gendux::tooling::{WatchConfig, WatchDaemon, WatchOutcome};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Writes `<stem>.js` next to each source, tagged with the version it saw.
struct RecordingService {
    emitted: Arc<Mutex<Vec<(PathBuf, u64)>>>,
}

impl CompilerService for RecordingService {
    fn emit(&self, file: &SourceFile, _options: &CompilerOptions) -> Result<EmitOutput, CompileError> {
        self.emitted.lock().push((file.path.clone(), file.version));
        Ok(EmitOutput {
            emit_skipped: false,
            output_files: vec![OutputFile {
                name: file.path.with_extension("js"),
                text: format!("// v{}\n", file.version),
            }],
        })
    }

    fn diagnostics(
        &self,
        _file: &SourceFile,
        _options: &CompilerOptions,
    ) -> Result<Vec<Diagnostic>, CompileError> {
        Ok(Vec::new())
    }
}

struct Fixture {
    _temp: TempDir,
    root: PathBuf,
    manifest: PathBuf,
    source: PathBuf,
    emitted: Arc<Mutex<Vec<(PathBuf, u64)>>>,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = dunce::canonicalize(temp.path()).unwrap();
        let manifest = write_manifest(
            &root,
            r#"{"name":"demo","gendux":{"actions":{"addTodo":{"path":"./addTodo"}}}}"#,
        );
        let source = root.join("addTodo.ts");
        std::fs::write(&source, "export default function addTodo() {}\n").unwrap();
        Self {
            _temp: temp,
            root,
            manifest,
            source,
            emitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn daemon(&self, persistent: bool) -> WatchDaemon {
        let mut config = WatchConfig::new(self.manifest.clone());
        config.source_files = vec![self.source.clone()];
        config.interval_ms = 20;
        config.persistent = persistent;
        let compiler = IncrementalCompiler::new(
            Box::new(RecordingService {
                emitted: Arc::clone(&self.emitted),
            }),
            CompilerOptions::default(),
            vec![self.source.clone()],
        );
        WatchDaemon::new(config, Some(compiler))
    }

    fn entry(&self) -> String {
        std::fs::read_to_string(self.root.join("src/index.ts")).unwrap()
    }
}

#[test]
fn test_startup_emits_sources_and_generates_once() {
    let fx = Fixture::new();
    let daemon = fx.daemon(false);

    let written = daemon.startup().unwrap();
    assert_eq!(written, Some(fx.root.join("src/index.ts")));
    assert!(fx.entry().contains("packet.action(\"addTodo\", addTodo)"));
    assert_eq!(*fx.emitted.lock(), vec![(fx.source.clone(), 0)]);
    assert_eq!(
        std::fs::read_to_string(fx.root.join("addTodo.js")).unwrap(),
        "// v0\n"
    );
}

#[test]
fn test_startup_without_manifest_names_the_path() {
    let fx = Fixture::new();
    std::fs::remove_file(&fx.manifest).unwrap();

    let err = fx.daemon(false).startup().unwrap_err();
    assert!(err.to_string().contains(&fx.manifest.display().to_string()));
    assert!(!fx.root.join("src/index.ts").exists());
}

#[test]
fn test_changes_dispatch_only_when_mtime_advances() {
    let fx = Fixture::new();
    let daemon = fx.daemon(false);
    daemon.startup().unwrap();

    assert!(daemon.handle_change(&fx.manifest).is_none());
    assert!(daemon.handle_change(&fx.source).is_none());
    assert!(daemon.handle_change(&fx.root.join("unrelated.ts")).is_none());

    write_manifest(
        &fx.root,
        r#"{"name":"demo","gendux":{"actions":{"addTodo":{"path":"./addTodo"},"clear":{"path":"./clear"}}}}"#,
    );
    touch_later(&fx.manifest, 5);
    match daemon.handle_change(&fx.manifest) {
        Some(WatchOutcome::Regenerated(path)) => assert_eq!(path, fx.root.join("src/index.ts")),
        other => panic!("expected regeneration, got {:?}", other),
    }
    assert!(fx.entry().contains("packet.action(\"clear\", clear)"));
    assert!(daemon.handle_change(&fx.manifest).is_none());

    touch_later(&fx.source, 5);
    match daemon.handle_change(&fx.source) {
        Some(WatchOutcome::Compiled(report)) => {
            assert_eq!(report.version, 1);
            assert!(report.emitted);
        }
        other => panic!("expected compile, got {:?}", other),
    }
    assert_eq!(
        std::fs::read_to_string(fx.root.join("addTodo.js")).unwrap(),
        "// v1\n"
    );
}

#[test]
fn test_failed_regeneration_keeps_watching_and_retries() {
    let fx = Fixture::new();
    let daemon = fx.daemon(false);
    daemon.startup().unwrap();
    let before = fx.entry();

    write_manifest(&fx.root, r#"{"name":"demo","gendux":{"actions":"#);
    touch_later(&fx.manifest, 5);
    assert!(matches!(
        daemon.handle_change(&fx.manifest),
        Some(WatchOutcome::RegenerationFailed(_))
    ));
    assert_eq!(fx.entry(), before);

    write_manifest(&fx.root, r#"{"name":"renamed","gendux":{"actions":{}}}"#);
    touch_later(&fx.manifest, 10);
    assert!(matches!(
        daemon.handle_change(&fx.manifest),
        Some(WatchOutcome::Regenerated(_))
    ));
    assert!(fx.entry().contains("packet(\"renamed\""));
}

#[test]
fn test_non_persistent_start_returns_after_startup() {
    let fx = Fixture::new();
    let daemon = fx.daemon(false);

    daemon.start().unwrap();
    assert!(!*daemon.running_flag().read());
    assert!(fx.root.join("src/index.ts").exists());
}

#[test]
fn test_persistent_daemon_picks_up_manifest_edits() {
    let fx = Fixture::new();
    let daemon = Arc::new(fx.daemon(true));
    let running = daemon.running_flag();

    let worker = {
        let daemon = Arc::clone(&daemon);
        std::thread::spawn(move || daemon.start())
    };

    let deadline = Instant::now() + Duration::from_secs(10);
    while !(*running.read() && fx.root.join("src/index.ts").exists()) {
        assert!(Instant::now() < deadline, "daemon did not start");
        std::thread::sleep(Duration::from_millis(20));
    }
    // Give the poll watcher time to take its first snapshot.
    std::thread::sleep(Duration::from_millis(200));

    write_manifest(
        &fx.root,
        r#"{"name":"demo","gendux":{"actions":{"archive":{"path":"./archive"}}}}"#,
    );
    touch_later(&fx.manifest, 5);

    while !fx.entry().contains("archive") {
        assert!(Instant::now() < deadline, "manifest edit was not picked up");
        std::thread::sleep(Duration::from_millis(20));
    }

    daemon.stop();
    worker.join().unwrap().unwrap();
}

