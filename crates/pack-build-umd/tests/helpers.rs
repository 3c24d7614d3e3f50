//! Package fixtures shared by the integration tests.

#![allow(dead_code)]

use pack_build_umd::{BundleOptions, JobContext, Reporter};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A package output directory with `dist-src/` populated from `files`.
pub fn package(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (relative, contents) in files {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}

/// Records every path reported as created.
#[derive(Default)]
pub struct RecordingReporter(pub Mutex<Vec<PathBuf>>);

impl Reporter for RecordingReporter {
    fn created(&self, path: &Path) {
        self.0.lock().push(path.to_path_buf());
    }
}

pub fn context(dir: &TempDir, options: BundleOptions) -> (JobContext, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::default());
    let ctx = JobContext::new(dir.path(), options).with_reporter(reporter.clone());
    (ctx, reporter)
}

pub fn read(dir: &TempDir, relative: &str) -> String {
    fs::read_to_string(dir.path().join(relative))
        .unwrap_or_else(|e| panic!("expected {relative} to exist: {e}"))
}
