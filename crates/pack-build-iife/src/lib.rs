//! IIFE build plugin for package pipelines.
//!
//! Produces `dist-browser/index.min.js`: a self-executing bundle that assigns
//! the package's exports to the global named by the `name` option. The
//! manifest's `browser` key points at it by default.

pub use pack_build_core::{
    BrowserBundler, BundleOptions, BundleVariant, Entrypoint, Error, JobContext, Minify,
    PackageManifest, PipelinePlugin, Reporter, Result, WarningHandler,
};

/// Identifier of this plugin in a package's pipeline configuration.
pub const PLUGIN_ID: &str = "@pika/plugin-build-iife";

const BUNDLER: BrowserBundler = BrowserBundler::new(BundleVariant::IIFE);

pub fn before_job(ctx: &JobContext) -> Result<()> {
    BUNDLER.before_job(ctx)
}

pub fn manifest(manifest: &mut PackageManifest, ctx: &JobContext) {
    BUNDLER.manifest(manifest, ctx)
}

pub async fn build(ctx: &JobContext) -> Result<()> {
    BUNDLER.build(ctx).await
}

pub fn plugin() -> Box<dyn PipelinePlugin> {
    Box::new(BUNDLER)
}

/// Read this plugin's options from the pipeline in `package.json`.
pub fn load_options(package_json: impl AsRef<std::path::Path>) -> Result<BundleOptions> {
    BundleOptions::from_package_json(package_json, PLUGIN_ID)
}
