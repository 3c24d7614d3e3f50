//! UMD build plugin for package pipelines.
//!
//! Bundles `dist-src/index.js` and everything it imports from
//! `node_modules` into a single minified Universal Module Definition file at
//! `dist-umd/index.min.js`. The bundle works as a CommonJS module, an AMD
//! module, or a browser global named after the `name` option.
//!
//! On top of the shared syntax passes, UMD output always lowers class
//! properties so the result runs in older AMD loaders.
//!
//! ```rust,no_run
//! use pack_build_umd::{BundleOptions, JobContext};
//!
//! # async fn example() -> pack_build_umd::Result<()> {
//! let ctx = JobContext::new("./pkg", BundleOptions::new("MyLib"));
//!
//! pack_build_umd::before_job(&ctx)?;
//! let mut manifest = pack_build_umd::PackageManifest::new();
//! pack_build_umd::manifest(&mut manifest, &ctx);
//! pack_build_umd::build(&ctx).await?;
//!
//! assert_eq!(manifest["umd:main"], "dist-umd/index.min.js");
//! # Ok(())
//! # }
//! ```

pub use pack_build_core::{
    BrowserBundler, BundleOptions, BundleVariant, Entrypoint, Error, JobContext, Minify,
    PackageManifest, PipelinePlugin, Reporter, Result, WarningHandler,
};

/// Identifier of this plugin in a package's pipeline configuration.
pub const PLUGIN_ID: &str = "@pika/plugin-build-umd";

const BUNDLER: BrowserBundler = BrowserBundler::new(BundleVariant::UMD);

/// Fail fast if `name` is unset or `dist-src/index.js` is missing.
pub fn before_job(ctx: &JobContext) -> Result<()> {
    BUNDLER.before_job(ctx)
}

/// Set `umd:main` (or the configured `entrypoint` keys) unless already present.
pub fn manifest(manifest: &mut PackageManifest, ctx: &JobContext) {
    BUNDLER.manifest(manifest, ctx)
}

/// Write `dist-umd/index.min.js`.
pub async fn build(ctx: &JobContext) -> Result<()> {
    BUNDLER.build(ctx).await
}

/// The plugin as a pipeline trait object.
pub fn plugin() -> Box<dyn PipelinePlugin> {
    Box::new(BUNDLER)
}

/// Read this plugin's options from the pipeline in `package.json`.
pub fn load_options(package_json: impl AsRef<std::path::Path>) -> Result<BundleOptions> {
    BundleOptions::from_package_json(package_json, PLUGIN_ID)
}
