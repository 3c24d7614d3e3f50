//! Engine warning routing.
//!
//! Rollup-style bundlers report an unresolved bare import and leave it
//! external. That case is expected for browser bundles of packages with
//! peer dependencies, so [`WarningFilter`] drops it and forwards the rest.

use crate::Result;
use crate::diagnostics::{DiagnosticKind, ExtractedDiagnostic};
use crate::plugins::SpecifierKind;

/// Receives engine warnings that survived filtering.
///
/// Returning an error escalates the warning and aborts the build.
pub trait WarningHandler: Send + Sync {
    fn handle(&self, warning: &ExtractedDiagnostic) -> Result<()>;
}

/// Logs every warning at `warn` level and never escalates.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWarningHandler;

impl WarningHandler for LogWarningHandler {
    fn handle(&self, warning: &ExtractedDiagnostic) -> Result<()> {
        tracing::warn!(
            kind = %warning.kind,
            file = warning.file.as_deref().unwrap_or(""),
            "{}",
            warning.message
        );
        Ok(())
    }
}

/// Decides which engine warnings reach the handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct WarningFilter;

impl WarningFilter {
    /// Unresolved imports of non-relative specifiers are expected externals.
    pub fn suppresses(&self, warning: &ExtractedDiagnostic) -> bool {
        if warning.kind != DiagnosticKind::UnresolvedImport {
            return false;
        }
        match warning.specifier.as_deref() {
            Some(specifier) => SpecifierKind::of(specifier) != SpecifierKind::Relative,
            None => false,
        }
    }

    /// Forward unsuppressed warnings in order, stopping at the first escalation.
    ///
    /// Returns the number of warnings forwarded.
    pub fn forward(
        &self,
        warnings: impl IntoIterator<Item = ExtractedDiagnostic>,
        handler: &dyn WarningHandler,
    ) -> Result<usize> {
        let mut forwarded = 0;
        for warning in warnings {
            if self.suppresses(&warning) {
                tracing::debug!(specifier = ?warning.specifier, "suppressed unresolved import warning");
                continue;
            }
            handler.handle(&warning)?;
            forwarded += 1;
        }
        Ok(forwarded)
    }
}
