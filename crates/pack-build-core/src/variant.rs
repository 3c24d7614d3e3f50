//! Bundle format descriptors.
//!
//! The UMD and IIFE plugins differ only in the handful of values captured
//! here; everything else is shared by [`BrowserBundler`](crate::BrowserBundler).

use rolldown::OutputFormat;

use crate::plan::SyntaxPass;

/// Describes one browser bundle format.
#[derive(Debug, Clone, Copy)]
pub struct BundleVariant {
    /// Rolldown output format.
    pub format: OutputFormat,
    /// Human-readable format name used in messages.
    pub label: &'static str,
    /// Directory under the package output directory that receives the bundle.
    pub output_subdir: &'static str,
    /// Manifest key populated when the caller does not choose one.
    pub default_manifest_key: &'static str,
    /// Syntax passes added on top of the shared ones.
    pub extra_syntax_passes: &'static [SyntaxPass],
}

impl BundleVariant {
    /// Universal Module Definition bundle in `dist-umd/`.
    pub const UMD: BundleVariant = BundleVariant {
        format: OutputFormat::Umd,
        label: "UMD",
        output_subdir: "dist-umd",
        default_manifest_key: "umd:main",
        extra_syntax_passes: &[SyntaxPass::ClassProperties],
    };

    /// Browser-global (IIFE) bundle in `dist-browser/`.
    pub const IIFE: BundleVariant = BundleVariant {
        format: OutputFormat::Iife,
        label: "IIFE",
        output_subdir: "dist-browser",
        default_manifest_key: "browser",
        extra_syntax_passes: &[],
    };

    /// Manifest-relative path of the minified entry file.
    pub fn entry_path(&self) -> String {
        format!("{}/index.min.js", self.output_subdir)
    }
}

impl std::fmt::Display for BundleVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_paths() {
        assert_eq!(BundleVariant::UMD.entry_path(), "dist-umd/index.min.js");
        assert_eq!(BundleVariant::IIFE.entry_path(), "dist-browser/index.min.js");
    }

    #[test]
    fn test_only_umd_adds_class_properties() {
        assert_eq!(
            BundleVariant::UMD.extra_syntax_passes,
            &[SyntaxPass::ClassProperties]
        );
        assert!(BundleVariant::IIFE.extra_syntax_passes.is_empty());
    }
}
