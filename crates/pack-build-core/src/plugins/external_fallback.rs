//! Externalizes imports the bundle cannot or should not inline.
//!
//! Rollup leaves an unresolvable bare import (`import 'left-pad'`) external
//! and carries on; Rolldown fails the build instead. This plugin restores the
//! Rollup behavior for bare specifiers only. Relative and absolute specifiers
//! are never claimed here, so a missing `./file` still fails the build.
//!
//! With `prefer_builtins`, Node.js built-ins are externalized before
//! `node_modules` is consulted.

use oxc_resolver::{ResolveOptions as OxcResolveOptions, Resolver};
use rolldown_common::ResolvedExternal;
use rolldown_plugin::{
    HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use super::registry::{PhasedPlugin, PluginPhase};
use crate::target::{ExportConditions, is_node_builtin};

/// Why a specifier was left external.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalReason {
    /// Node.js built-in module.
    Builtin,
    /// Bare specifier that no `node_modules` directory provides.
    Unresolved,
}

/// Specifier classification used by the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// `./x`, `../x`
    Relative,
    /// `/abs/x` or a drive/URL-like id the engine owns
    Absolute,
    /// `pkg`, `@scope/pkg/sub`
    Bare,
}

impl SpecifierKind {
    pub fn of(specifier: &str) -> Self {
        if specifier.starts_with("./")
            || specifier.starts_with("../")
            || specifier == "."
            || specifier == ".."
        {
            SpecifierKind::Relative
        } else if specifier.starts_with('/')
            || specifier.starts_with('\0')
            || (specifier.contains(':') && !specifier.starts_with("node:"))
        {
            SpecifierKind::Absolute
        } else {
            SpecifierKind::Bare
        }
    }
}

/// Rolldown plugin that externalizes built-ins and unresolvable bare imports.
pub struct ExternalFallbackPlugin {
    prefer_builtins: bool,
    resolver: Arc<Resolver>,
}

impl ExternalFallbackPlugin {
    pub fn new(prefer_builtins: bool, conditions: ExportConditions) -> Self {
        let resolver = Resolver::new(OxcResolveOptions {
            condition_names: conditions.to_vec(),
            main_fields: conditions.main_fields().iter().map(|s| (*s).to_string()).collect(),
            extensions: [".js", ".mjs", ".cjs", ".json"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            ..Default::default()
        });

        Self {
            prefer_builtins,
            resolver: Arc::new(resolver),
        }
    }

    fn classify(&self, specifier: &str, importer: &str) -> Option<ExternalReason> {
        if SpecifierKind::of(specifier) != SpecifierKind::Bare {
            return None;
        }

        if self.prefer_builtins && is_node_builtin(specifier) {
            return Some(ExternalReason::Builtin);
        }

        let dir = Path::new(importer).parent().unwrap_or_else(|| Path::new("."));
        match self.resolver.resolve(dir, specifier) {
            Ok(_) => None,
            Err(_) => Some(ExternalReason::Unresolved),
        }
    }
}

impl std::fmt::Debug for ExternalFallbackPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalFallbackPlugin")
            .field("prefer_builtins", &self.prefer_builtins)
            .finish_non_exhaustive()
    }
}

impl Plugin for ExternalFallbackPlugin {
    fn name(&self) -> Cow<'static, str> {
        "pack-external-fallback".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let reason = args
            .importer
            .as_deref()
            .and_then(|importer| self.classify(&specifier, importer));

        async move {
            let Some(reason) = reason else {
                return Ok(None);
            };

            tracing::debug!(%specifier, ?reason, "leaving import external");

            Ok(Some(HookResolveIdOutput {
                id: specifier.into(),
                external: Some(ResolvedExternal::Bool(true)),
                ..Default::default()
            }))
        }
    }
}

impl PhasedPlugin for ExternalFallbackPlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Resolve
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_specifier_kinds() {
        assert_eq!(SpecifierKind::of("./missing"), SpecifierKind::Relative);
        assert_eq!(SpecifierKind::of("../up"), SpecifierKind::Relative);
        assert_eq!(SpecifierKind::of("/abs/file.js"), SpecifierKind::Absolute);
        assert_eq!(SpecifierKind::of("\0virtual"), SpecifierKind::Absolute);
        assert_eq!(SpecifierKind::of("left-pad"), SpecifierKind::Bare);
        assert_eq!(SpecifierKind::of("@scope/pkg/sub"), SpecifierKind::Bare);
        assert_eq!(SpecifierKind::of("node:fs"), SpecifierKind::Bare);
    }

    #[test]
    fn test_relative_is_never_claimed() {
        let plugin = ExternalFallbackPlugin::new(true, ExportConditions::Neutral);
        assert_eq!(plugin.classify("./missing", "/tmp/pkg/index.js"), None);
    }

    #[test]
    fn test_builtins_preferred() {
        let plugin = ExternalFallbackPlugin::new(true, ExportConditions::Neutral);
        assert_eq!(
            plugin.classify("fs", "/tmp/pkg/index.js"),
            Some(ExternalReason::Builtin)
        );
    }

    #[test]
    fn test_unresolved_bare_and_installed_package() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("dist-src");
        let pkg = dir.path().join("node_modules/tiny");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("package.json"), r#"{"name":"tiny","main":"index.js"}"#).unwrap();
        fs::write(pkg.join("index.js"), "module.exports = 1;").unwrap();
        let importer = src.join("index.js");
        let importer = importer.to_str().unwrap();

        let plugin = ExternalFallbackPlugin::new(true, ExportConditions::Neutral);
        assert_eq!(plugin.classify("tiny", importer), None);
        assert_eq!(
            plugin.classify("left-pad", importer),
            Some(ExternalReason::Unresolved)
        );
    }
}
