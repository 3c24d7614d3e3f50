//! The browser bundle plugin, shared by the UMD and IIFE variants.

use async_trait::async_trait;
use rolldown::BundlerBuilder as RolldownBundlerBuilder;
use serde_json::Value;

use crate::context::JobContext;
use crate::diagnostics;
use crate::output::write_bundle;
use crate::plan::BundlePlan;
use crate::variant::BundleVariant;
use crate::warnings::WarningFilter;
use crate::{Error, Result};

/// A package manifest (`package.json`) as a mutable JSON object.
pub type PackageManifest = serde_json::Map<String, Value>;

/// The three stages a package pipeline drives a build plugin through.
#[async_trait]
pub trait PipelinePlugin: Send + Sync {
    /// Bundle format this plugin produces.
    fn variant(&self) -> &BundleVariant;

    /// Pre-flight checks, run before any plugin builds.
    fn before_job(&self, ctx: &JobContext) -> Result<()>;

    /// Advertise the bundle in the package manifest.
    fn manifest(&self, manifest: &mut PackageManifest, ctx: &JobContext);

    /// Produce the bundle.
    async fn build(&self, ctx: &JobContext) -> Result<()>;
}

/// Browser bundler parameterized by its output format.
#[derive(Debug, Clone, Copy)]
pub struct BrowserBundler {
    variant: BundleVariant,
}

impl BrowserBundler {
    pub const fn new(variant: BundleVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> &BundleVariant {
        &self.variant
    }

    fn require_name<'a>(&self, ctx: &'a JobContext) -> Result<&'a str> {
        ctx.options.global_name().ok_or_else(|| {
            Error::Configuration(format!("Missing name for {} bundle.", self.variant.label))
        })
    }

    /// Check that a global name is configured and that `dist-src/index.js` exists.
    pub fn before_job(&self, ctx: &JobContext) -> Result<()> {
        self.require_name(ctx)?;

        let src = ctx.source_dir();
        if !src.is_dir() {
            return Err(Error::PipelineState(
                "\"dist-src/\" does not exist, or was not yet created in the pipeline.".to_string(),
            ));
        }
        if !src.join("index.js").is_file() {
            return Err(Error::PipelineState(
                "\"dist-src/index.js\" is the expected standard entrypoint, but it does not exist."
                    .to_string(),
            ));
        }

        tracing::debug!(variant = %self.variant, out = %ctx.out.display(), "pre-flight checks passed");
        Ok(())
    }

    /// Point the configured manifest keys at the bundle, keeping existing values.
    pub fn manifest(&self, manifest: &mut PackageManifest, ctx: &JobContext) {
        let Some(keys) = ctx
            .options
            .entrypoint
            .resolve(self.variant.default_manifest_key)
        else {
            return;
        };

        let entry = self.variant.entry_path();
        for key in keys {
            if manifest.contains_key(&key) {
                tracing::debug!(%key, "manifest key already set, leaving it");
                continue;
            }
            manifest.insert(key, Value::String(entry.clone()));
        }
    }

    /// Bundle `dist-src/index.js` into `<subdir>/index.min.js`.
    pub async fn build(&self, ctx: &JobContext) -> Result<()> {
        let name = self.require_name(ctx)?;
        let plan = BundlePlan::new(&ctx.out, name, &self.variant, &ctx.options);

        tracing::debug!(
            variant = %self.variant,
            steps = ?plan.steps().iter().map(|s| s.name()).collect::<Vec<_>>(),
            "bundling"
        );

        let out_dir = plan.output().dir.clone();
        let (options, plugins) = plan.into_engine();

        let mut bundler = RolldownBundlerBuilder::default()
            .with_options(options)
            .with_plugins(plugins)
            .build()
            .map_err(|e| Error::from_rolldown_batch(&e))?;

        let bundle = bundler
            .generate()
            .await
            .map_err(|e| Error::from_rolldown_batch(&e))?;

        let warnings = bundle
            .warnings
            .iter()
            .map(|warning| diagnostics::extract_warning(warning));
        WarningFilter.forward(warnings, ctx.warnings.as_ref())?;

        write_bundle(&bundle, &out_dir)?;

        ctx.reporter.created(&out_dir.join("index.min.js"));
        Ok(())
    }
}

#[async_trait]
impl PipelinePlugin for BrowserBundler {
    fn variant(&self) -> &BundleVariant {
        &self.variant
    }

    fn before_job(&self, ctx: &JobContext) -> Result<()> {
        BrowserBundler::before_job(self, ctx)
    }

    fn manifest(&self, manifest: &mut PackageManifest, ctx: &JobContext) {
        BrowserBundler::manifest(self, manifest, ctx)
    }

    async fn build(&self, ctx: &JobContext) -> Result<()> {
        BrowserBundler::build(self, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{BundleOptions, Entrypoint};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn package(with_src: bool, with_index: bool) -> TempDir {
        let dir = TempDir::new().unwrap();
        if with_src {
            fs::create_dir_all(dir.path().join("dist-src")).unwrap();
        }
        if with_index {
            fs::write(dir.path().join("dist-src/index.js"), "export const x = 1;").unwrap();
        }
        dir
    }

    fn manifest_of(value: Value) -> PackageManifest {
        match value {
            Value::Object(map) => map,
            _ => panic!("manifest must be an object"),
        }
    }

    #[test]
    fn test_missing_name_wins_over_missing_files() {
        let dir = package(false, false);
        for options in [BundleOptions::default(), BundleOptions::new("")] {
            let ctx = JobContext::new(dir.path(), options);
            let err = BrowserBundler::new(BundleVariant::IIFE)
                .before_job(&ctx)
                .unwrap_err();
            assert!(err.is_configuration());
            assert_eq!(err.to_string(), "Missing name for IIFE bundle.");
        }
    }

    #[test]
    fn test_missing_dist_src() {
        let dir = package(false, false);
        let ctx = JobContext::new(dir.path(), BundleOptions::new("MyLib"));
        let err = BrowserBundler::new(BundleVariant::UMD)
            .before_job(&ctx)
            .unwrap_err();
        assert!(err.is_pipeline_state());
        assert!(err.to_string().starts_with("\"dist-src/\" does not exist"));
    }

    #[test]
    fn test_missing_index() {
        let dir = package(true, false);
        let ctx = JobContext::new(dir.path(), BundleOptions::new("MyLib"));
        let err = BrowserBundler::new(BundleVariant::UMD)
            .before_job(&ctx)
            .unwrap_err();
        assert!(err.to_string().starts_with("\"dist-src/index.js\""));
    }

    #[test]
    fn test_before_job_ok() {
        let dir = package(true, true);
        let ctx = JobContext::new(dir.path(), BundleOptions::new("MyLib"));
        assert!(BrowserBundler::new(BundleVariant::UMD).before_job(&ctx).is_ok());
    }

    #[test]
    fn test_manifest_default_key() {
        let ctx = JobContext::new("/pkg", BundleOptions::new("MyLib"));
        let mut manifest = manifest_of(json!({ "name": "my-lib" }));

        BrowserBundler::new(BundleVariant::UMD).manifest(&mut manifest, &ctx);
        BrowserBundler::new(BundleVariant::IIFE).manifest(&mut manifest, &ctx);

        assert_eq!(manifest["umd:main"], "dist-umd/index.min.js");
        assert_eq!(manifest["browser"], "dist-browser/index.min.js");
    }

    #[test]
    fn test_manifest_keeps_existing_and_is_idempotent() {
        let ctx = JobContext::new("/pkg", BundleOptions::new("MyLib"));
        let bundler = BrowserBundler::new(BundleVariant::IIFE);
        let mut manifest = manifest_of(json!({ "browser": "" }));

        bundler.manifest(&mut manifest, &ctx);
        assert_eq!(manifest["browser"], "");

        let mut fresh = PackageManifest::new();
        bundler.manifest(&mut fresh, &ctx);
        let once = fresh.clone();
        bundler.manifest(&mut fresh, &ctx);
        assert_eq!(fresh, once);
    }

    #[test]
    fn test_manifest_disabled_and_custom_keys() {
        let bundler = BrowserBundler::new(BundleVariant::UMD);

        let ctx = JobContext::new(
            "/pkg",
            BundleOptions::new("MyLib").entrypoint(Entrypoint::Disabled),
        );
        let mut manifest = manifest_of(json!({ "name": "my-lib" }));
        bundler.manifest(&mut manifest, &ctx);
        assert_eq!(Value::Object(manifest), json!({ "name": "my-lib" }));

        let ctx = JobContext::new(
            "/pkg",
            BundleOptions::new("MyLib").entrypoint(Entrypoint::key("custom:key")),
        );
        let mut manifest = PackageManifest::new();
        bundler.manifest(&mut manifest, &ctx);
        assert_eq!(
            Value::Object(manifest),
            json!({ "custom:key": "dist-umd/index.min.js" })
        );
    }

    #[tokio::test]
    async fn test_build_requires_name_before_io() {
        let ctx = JobContext::new("/definitely/not/a/package", BundleOptions::default());
        let err = BrowserBundler::new(BundleVariant::UMD)
            .build(&ctx)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing name for UMD bundle.");
    }

    #[test]
    fn test_trait_object() {
        let plugin: Box<dyn PipelinePlugin> = Box::new(BrowserBundler::new(BundleVariant::IIFE));
        assert_eq!(plugin.variant().label, "IIFE");
    }
}
