//! Rolldown plugins registered by the pipeline steps.

pub mod external_fallback;
pub mod registry;

pub use external_fallback::{ExternalFallbackPlugin, ExternalReason, SpecifierKind};
pub use registry::{PhasedPlugin, PluginPhase, PluginRegistry};
