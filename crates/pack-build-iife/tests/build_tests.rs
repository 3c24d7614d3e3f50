mod helpers;

use helpers::{context, package, read};
use pack_build_iife::{BundleOptions, Entrypoint, Error, JobContext, Minify, PackageManifest};
use serde_json::{Value, json};

const MINIMAL: &str = "export const x = 1;\nexport default function greet(who) {\n  return 'hi ' + who;\n}\n";

#[test]
fn test_before_job_uses_iife_label() {
    let dir = package(&[]);
    let ctx = JobContext::new(dir.path(), BundleOptions::default());

    let err = pack_build_iife::before_job(&ctx).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert_eq!(err.to_string(), "Missing name for IIFE bundle.");
}

#[test]
fn test_before_job_checks_source_tree() {
    let dir = package(&[]);
    let ctx = JobContext::new(dir.path(), BundleOptions::new("MyLib"));
    assert!(matches!(
        pack_build_iife::before_job(&ctx),
        Err(Error::PipelineState(_))
    ));

    let dir = package(&[("dist-src/index.js", MINIMAL)]);
    let ctx = JobContext::new(dir.path(), BundleOptions::new("MyLib"));
    pack_build_iife::before_job(&ctx).unwrap();
}

#[test]
fn test_manifest_sets_browser() {
    let ctx = JobContext::new("/pkg", BundleOptions::new("MyLib"));
    let mut manifest = PackageManifest::new();
    manifest.insert("name".into(), json!("my-lib"));

    pack_build_iife::manifest(&mut manifest, &ctx);
    assert_eq!(
        Value::Object(manifest.clone()),
        json!({ "name": "my-lib", "browser": "dist-browser/index.min.js" })
    );

    let before = manifest.clone();
    pack_build_iife::manifest(&mut manifest, &ctx);
    assert_eq!(manifest, before);
}

#[test]
fn test_manifest_disabled() {
    let ctx = JobContext::new(
        "/pkg",
        BundleOptions::new("MyLib").entrypoint(Entrypoint::Disabled),
    );
    let mut manifest = PackageManifest::new();
    pack_build_iife::manifest(&mut manifest, &ctx);
    assert!(manifest.is_empty());
}

#[tokio::test]
async fn test_build_minimal_package() {
    let dir = package(&[("dist-src/index.js", MINIMAL)]);
    let (ctx, reporter) = context(&dir, BundleOptions::new("MyLib"));

    pack_build_iife::build(&ctx).await.unwrap();

    let code = read(&dir, "dist-browser/index.min.js");
    assert!(
        code.contains("var MyLib=") || code.contains("var MyLib ="),
        "global declaration missing:\n{code}"
    );
    assert!(!dir.path().join("dist-umd").exists());
    assert_eq!(
        reporter.0.lock().as_slice(),
        &[dir.path().join("dist-browser/index.min.js")]
    );
}

#[tokio::test]
async fn test_build_unminified_keeps_identifiers() {
    let dir = package(&[("dist-src/index.js", MINIMAL)]);
    let (ctx, _) = context(&dir, BundleOptions::new("MyLib").minify(Minify::Disabled));

    pack_build_iife::build(&ctx).await.unwrap();

    let code = read(&dir, "dist-browser/index.min.js");
    assert!(code.contains("x = 1"), "identifier x should survive:\n{code}");
    assert!(code.contains('\n'));
    assert!(code.contains("var MyLib = "), "missing global:\n{code}");
    assert!(code.contains("exports.x = x;"), "x should be exported:\n{code}");
    assert!(code.contains("return exports;"), "exports object not returned:\n{code}");
}

#[tokio::test]
async fn test_missing_relative_import_fails() {
    let dir = package(&[("dist-src/index.js", "export * from './gone.js';\n")]);
    let (ctx, _) = context(&dir, BundleOptions::new("MyLib"));

    assert!(pack_build_iife::build(&ctx).await.is_err());
    assert!(!dir.path().join("dist-browser/index.min.js").exists());
}

#[tokio::test]
async fn test_builtin_import_stays_external() {
    let dir = package(&[(
        "dist-src/index.js",
        "import { join } from 'path';\nexport const where = join('a', 'b');\n",
    )]);
    let (ctx, _) = context(&dir, BundleOptions::new("MyLib").browser(true));

    pack_build_iife::build(&ctx).await.unwrap();
    assert!(dir.path().join("dist-browser/index.min.js").is_file());
}
