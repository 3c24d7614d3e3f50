//! The bundling plan: an ordered chain of pipeline steps as plain data.
//!
//! A [`BundlePlan`] records *what* the engine should do; [`BundlePlan::into_engine`]
//! turns it into Rolldown options and plugins. Nothing in here bundles,
//! resolves, or minifies by itself.

use itertools::Either;
use rolldown::{BundlerOptions, InputItem, OutputFormat, Platform, ResolveOptions, SourceMapType};
use rolldown_common::{BundlerTransformOptions, OutputExports};
use rolldown_plugin::__inner::SharedPluginable;
use std::path::{Path, PathBuf};

use crate::options::{BundleOptions, MinifierConfig, NamedExports};
use crate::plugins::{ExternalFallbackPlugin, PluginRegistry};
use crate::target::{BrowserMatrix, ExportConditions};
use crate::variant::BundleVariant;

/// Glob that limits CommonJS interop and JSON imports to dependencies.
pub const DEPENDENCY_GLOB: &str = "node_modules/**";

/// Syntax passes run by the transform step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxPass {
    /// `import()` expressions.
    DynamicImport,
    /// `import.meta`.
    ImportMeta,
    /// Class fields and static properties, always lowered.
    ClassProperties,
}

impl SyntaxPass {
    /// Passes every variant runs.
    pub const SHARED: [SyntaxPass; 2] = [SyntaxPass::DynamicImport, SyntaxPass::ImportMeta];

    /// Extra engine target this pass forces, if any.
    ///
    /// Dynamic import and `import.meta` are parsed natively by the engine, so
    /// only class properties need a floor below the browser matrix.
    fn target_floor(&self) -> Option<&'static str> {
        match self {
            SyntaxPass::DynamicImport | SyntaxPass::ImportMeta => None,
            SyntaxPass::ClassProperties => Some("es2021"),
        }
    }
}

/// One configuration record in the bundling chain.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStep {
    /// Module resolution.
    Resolve { prefer_builtins: bool, browser: bool },
    /// CommonJS-to-ESM interop.
    CommonJs {
        include: &'static str,
        sourcemap: bool,
        named_exports: NamedExports,
    },
    /// JSON imports.
    Json { include: &'static str, compact: bool },
    /// Downlevel syntax transform.
    Syntax {
        matrix: BrowserMatrix,
        modules: bool,
        spec: bool,
        compact: bool,
        passes: Vec<SyntaxPass>,
    },
    /// Minification.
    Minify(MinifierConfig),
}

impl PipelineStep {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStep::Resolve { .. } => "resolve",
            PipelineStep::CommonJs { .. } => "commonjs",
            PipelineStep::Json { .. } => "json",
            PipelineStep::Syntax { .. } => "syntax",
            PipelineStep::Minify(_) => "minify",
        }
    }

    /// Write this step into the engine configuration.
    pub fn apply(&self, options: &mut BundlerOptions, registry: &mut PluginRegistry) {
        match self {
            PipelineStep::Resolve {
                prefer_builtins,
                browser,
            } => {
                let conditions = ExportConditions::for_browser(*browser);
                options.platform = Some(if *browser {
                    Platform::Browser
                } else {
                    Platform::Neutral
                });
                options.resolve = Some(configure_resolution(&conditions));
                registry.add(
                    "external-fallback",
                    ExternalFallbackPlugin::new(*prefer_builtins, conditions),
                );
            }
            PipelineStep::CommonJs { named_exports, .. } => {
                // Rolldown's interop is built in and infers named exports
                // statically; explicit overrides are informational only.
                if !named_exports.is_empty() {
                    tracing::debug!(
                        modules = named_exports.len(),
                        "named export overrides recorded; interop is inferred by the engine"
                    );
                }
            }
            PipelineStep::Json { .. } => {
                let resolve = options.resolve.get_or_insert_with(ResolveOptions::default);
                let extensions = resolve.extensions.get_or_insert_with(Vec::new);
                if !extensions.iter().any(|ext| ext == ".json") {
                    extensions.push(".json".to_string());
                }
            }
            PipelineStep::Syntax { matrix, passes, .. } => {
                let mut targets: Vec<String> =
                    matrix.engines().iter().map(|s| (*s).to_string()).collect();
                targets.extend(
                    passes
                        .iter()
                        .filter_map(SyntaxPass::target_floor)
                        .map(str::to_string),
                );

                let transform = options
                    .transform
                    .get_or_insert_with(BundlerTransformOptions::default);
                transform.target = Some(Either::Right(targets));
            }
            PipelineStep::Minify(config) => {
                let format = options.format.unwrap_or(OutputFormat::Umd);
                options.minify = Some(config.to_rolldown_options(format));
            }
        }
    }
}

/// Output naming and format for a plan.
#[derive(Debug, Clone)]
pub struct OutputSpec {
    pub dir: PathBuf,
    pub format: OutputFormat,
    pub name: String,
    pub entry_filenames: &'static str,
    pub chunk_filenames: &'static str,
    pub sourcemap: bool,
}

/// The complete, ordered bundling configuration for one job.
#[derive(Debug, Clone)]
pub struct BundlePlan {
    input: PathBuf,
    cwd: PathBuf,
    steps: Vec<PipelineStep>,
    output: OutputSpec,
}

impl BundlePlan {
    /// Assemble the fixed chain for `variant` from the plugin options.
    ///
    /// `name` has already been validated as non-empty by the caller.
    pub fn new(out: &Path, name: &str, variant: &BundleVariant, options: &BundleOptions) -> Self {
        let mut passes = SyntaxPass::SHARED.to_vec();
        passes.extend_from_slice(variant.extra_syntax_passes);

        let mut steps = vec![
            PipelineStep::Resolve {
                prefer_builtins: true,
                browser: options.browser,
            },
            PipelineStep::CommonJs {
                include: DEPENDENCY_GLOB,
                sourcemap: false,
                named_exports: options.named_exports.clone(),
            },
            PipelineStep::Json {
                include: DEPENDENCY_GLOB,
                compact: true,
            },
            PipelineStep::Syntax {
                matrix: BrowserMatrix::last_two_versions(),
                modules: false,
                spec: true,
                compact: false,
                passes,
            },
        ];

        if let Some(config) = options.minify.config() {
            steps.push(PipelineStep::Minify(config));
        }

        Self {
            input: out.join("dist-src").join("index.js"),
            cwd: out.to_path_buf(),
            steps,
            output: OutputSpec {
                dir: out.join(variant.output_subdir),
                format: variant.format,
                name: name.to_string(),
                entry_filenames: "[name].min.js",
                chunk_filenames: "[name]-[hash].min.js",
                sourcemap: options.sourcemap_enabled(),
            },
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn output(&self) -> &OutputSpec {
        &self.output
    }

    /// Lower the plan to Rolldown options plus phase-ordered plugins.
    pub fn into_engine(self) -> (BundlerOptions, Vec<SharedPluginable>) {
        let mut options = BundlerOptions {
            input: Some(vec![InputItem {
                name: None,
                import: self.input.to_string_lossy().into_owned(),
            }]),
            cwd: Some(self.cwd),
            format: Some(self.output.format),
            name: Some(self.output.name),
            exports: Some(OutputExports::Named),
            entry_filenames: Some(self.output.entry_filenames.to_string().into()),
            chunk_filenames: Some(self.output.chunk_filenames.to_string().into()),
            sourcemap: self.output.sourcemap.then_some(SourceMapType::File),
            ..Default::default()
        };

        let mut registry = PluginRegistry::new();
        for step in &self.steps {
            tracing::trace!(step = step.name(), "applying pipeline step");
            step.apply(&mut options, &mut registry);
        }

        (options, registry.into_rolldown_plugins())
    }
}

/// Configure module resolution options.
fn configure_resolution(conditions: &ExportConditions) -> ResolveOptions {
    ResolveOptions {
        main_fields: Some(conditions.main_fields().iter().map(|s| (*s).to_string()).collect()),
        condition_names: Some(conditions.to_vec()),
        extensions: Some(vec![".js".to_string(), ".mjs".to_string(), ".cjs".to_string()]),
        modules: Some(vec!["node_modules".to_string()]),
        symlinks: Some(true),
        ..Default::default()
    }
}
