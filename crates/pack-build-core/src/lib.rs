#![cfg_attr(docsrs, feature(doc_cfg))]

//! # pack-build-core
//!
//! Shared machinery behind the `pack-build-umd` and `pack-build-iife` pipeline
//! plugins.
//!
//! A package pipeline calls each plugin at three stages:
//!
//! 1. [`BrowserBundler::before_job`] verifies that the transpiled source tree
//!    (`dist-src/index.js`) exists and that a global name was configured.
//! 2. [`BrowserBundler::manifest`] advertises the bundle in `package.json`
//!    without touching keys the author already set.
//! 3. [`BrowserBundler::build`] hands a fixed plugin chain to Rolldown and
//!    writes `<subdir>/index.min.js` (plus chunks and source maps).
//!
//! The bundler is parameterized by a [`BundleVariant`], so the UMD and IIFE
//! plugins are two instances of the same component.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pack_build_core::{BrowserBundler, BundleOptions, BundleVariant, JobContext};
//!
//! # #[tokio::main]
//! # async fn main() -> pack_build_core::Result<()> {
//! let options = BundleOptions::new("MyLib");
//! let ctx = JobContext::new("./pkg", options);
//! let bundler = BrowserBundler::new(BundleVariant::UMD);
//!
//! bundler.before_job(&ctx)?;
//!
//! let mut manifest = serde_json::Map::new();
//! bundler.manifest(&mut manifest, &ctx);
//!
//! bundler.build(&ctx).await?;
//! # Ok(()) }
//! ```

pub mod bundler;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod options;
pub mod output;
pub mod plan;
pub mod plugins;
pub mod target;
pub mod variant;
pub mod warnings;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use bundler::{BrowserBundler, PackageManifest, PipelinePlugin};
pub use context::{JobContext, Reporter, TracingReporter};
pub use diagnostics::{DiagnosticKind, DiagnosticSeverity, ExtractedDiagnostic};
pub use options::{BundleOptions, Entrypoint, MinifierConfig, Minify, NamedExports};
pub use plan::{BundlePlan, PipelineStep, SyntaxPass};
pub use target::BrowserMatrix;
pub use variant::BundleVariant;
pub use warnings::{LogWarningHandler, WarningFilter, WarningHandler};

// Re-export the engine types that appear in our public API
pub use rolldown::{BundleOutput, BundlerOptions, OutputFormat, Platform, SourceMapType};

/// Error types for pipeline plugin operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required option is missing or empty.
    #[error("{0}")]
    Configuration(String),

    /// An artifact an earlier pipeline stage should have produced is missing.
    #[error("{0}")]
    PipelineState(String),

    /// Error from the Rolldown engine.
    #[error("Bundling failed: {}", format_bundler_error(.0))]
    Bundler(Vec<diagnostics::ExtractedDiagnostic>),

    /// A bundling warning that the warning handler escalated to a failure.
    #[error("Bundling warning treated as error: {}: {}", .0.kind, .0.message)]
    Warning(diagnostics::ExtractedDiagnostic),

    /// Plugin options could not be loaded or deserialized.
    #[error("Invalid plugin options: {0}")]
    InvalidOptions(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),
}

/// Result type alias for pipeline plugin operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a bundler error from a Rolldown error.
    ///
    /// Extracts structured diagnostics from Rolldown's error types.
    pub fn from_rolldown_batch(error: &dyn std::fmt::Debug) -> Self {
        Error::Bundler(diagnostics::extract_from_rolldown_error(error))
    }

    /// Returns true for failures caused by plugin configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// Returns true for failures caused by a missing upstream artifact.
    pub fn is_pipeline_state(&self) -> bool {
        matches!(self, Error::PipelineState(_))
    }
}

fn format_bundler_error(diagnostics: &[diagnostics::ExtractedDiagnostic]) -> String {
    match diagnostics {
        [] => "Unknown bundler error".to_string(),
        [diag] => format!("{}: {}", diag.kind, diag.message),
        many => format!(
            "{} errors: {}",
            many.len(),
            many.iter()
                .map(|d| format!("{}: {}", d.kind, d.message))
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Configuration(_) => "CONFIGURATION_ERROR",
            Error::PipelineState(_) => "PIPELINE_STATE_ERROR",
            Error::Bundler(_) => "BUNDLER_ERROR",
            Error::Warning(_) => "BUNDLER_WARNING",
            Error::InvalidOptions(_) => "INVALID_OPTIONS",
            Error::Io(_) => "IO_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Configuration(_) => Some(Box::new(
                "Set the \"name\" option of the plugin to the global variable the bundle should expose.",
            )),
            Error::PipelineState(_) => Some(Box::new(
                "Run the source build step (which writes dist-src/) before the browser bundle steps.",
            )),
            Error::InvalidOptions(msg) => Some(Box::new(format!(
                "Check the plugin options in package.json for wrong field types.\nError: {}",
                msg
            ))),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it stays within the package output directory.",
                path
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            Error::Bundler(diagnostics) => match diagnostics.as_slice() {
                [diag] => diag
                    .help
                    .as_ref()
                    .map(|h| Box::new(h.clone()) as Box<dyn std::fmt::Display>),
                _ => Some(Box::new(
                    "Multiple bundler errors occurred. See details below.".to_string(),
                )),
            },
            Error::Warning(diag) => diag
                .help
                .as_ref()
                .map(|h| Box::new(h.clone()) as Box<dyn std::fmt::Display>),
            Error::Io(_) => None,
        }
    }
}
