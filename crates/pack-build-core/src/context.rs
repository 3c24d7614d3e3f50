//! Per-call job context handed to the plugins by the pipeline.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::options::BundleOptions;
use crate::warnings::{LogWarningHandler, WarningHandler};

/// Progress sink owned by the orchestrator.
pub trait Reporter: Send + Sync {
    /// A file was produced.
    fn created(&self, path: &Path);
}

/// Reports created files as `tracing` info events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn created(&self, path: &Path) {
        tracing::info!(path = %path.display(), "created");
    }
}

/// Everything one stage call needs: output directory, options, and sinks.
#[derive(Clone)]
pub struct JobContext {
    pub out: PathBuf,
    pub options: BundleOptions,
    pub reporter: Arc<dyn Reporter>,
    pub warnings: Arc<dyn WarningHandler>,
}

impl JobContext {
    /// Context with the default reporter and warning handler.
    pub fn new(out: impl Into<PathBuf>, options: BundleOptions) -> Self {
        Self {
            out: out.into(),
            options,
            reporter: Arc::new(TracingReporter),
            warnings: Arc::new(LogWarningHandler),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_warning_handler(mut self, handler: Arc<dyn WarningHandler>) -> Self {
        self.warnings = handler;
        self
    }

    /// `<out>/dist-src`
    pub fn source_dir(&self) -> PathBuf {
        self.out.join("dist-src")
    }
}

impl fmt::Debug for JobContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobContext")
            .field("out", &self.out)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<PathBuf>>);

    impl Reporter for Collect {
        fn created(&self, path: &Path) {
            self.0.lock().push(path.to_path_buf());
        }
    }

    #[test]
    fn test_custom_reporter() {
        let collect = Arc::new(Collect::default());
        let ctx = JobContext::new("/pkg", BundleOptions::new("MyLib")).with_reporter(collect.clone());

        ctx.reporter.created(Path::new("/pkg/dist-umd/index.min.js"));
        assert_eq!(collect.0.lock().len(), 1);
        assert_eq!(ctx.source_dir(), Path::new("/pkg/dist-src"));
    }

    #[test]
    fn test_debug_hides_sinks() {
        let ctx = JobContext::new("/pkg", BundleOptions::default());
        let debug = format!("{ctx:?}");
        assert!(debug.contains("/pkg"));
        assert!(!debug.contains("reporter"));
    }
}
