//! Plugin registry with execution phases.
//!
//! Pipeline steps register their Rolldown plugins here; the registry hands
//! them to the engine sorted by phase so resolution runs before transforms.

use rolldown_plugin::{__inner::SharedPluginable, Plugin};
use std::sync::Arc;

/// Plugin execution phases
///
/// Plugins are executed in phase order (lower numbers first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PluginPhase {
    /// Module resolution
    Resolve = 10,

    /// Content transformation
    Transform = 20,
}

/// A Rolldown plugin that knows which phase it belongs to.
pub trait PhasedPlugin: Plugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Transform
    }
}

/// Plugin registry that maintains plugins in phase order
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<(PluginPhase, &'static str, SharedPluginable)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin to the registry under its own phase.
    pub fn add<P: PhasedPlugin + 'static>(&mut self, name: &'static str, plugin: P) {
        let phase = plugin.phase();
        self.plugins.push((phase, name, Arc::new(plugin)));
    }

    /// Convert to Rolldown plugins in phase order.
    ///
    /// The sort is stable, so plugins within a phase keep insertion order.
    pub fn into_rolldown_plugins(mut self) -> Vec<SharedPluginable> {
        self.plugins.sort_by_key(|(phase, _, _)| *phase);
        self.plugins.into_iter().map(|(_, _, plugin)| plugin).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field(
                "plugins",
                &self.plugins.iter().map(|(phase, name, _)| (*phase, *name)).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[derive(Debug)]
    struct Named(&'static str);

    impl Plugin for Named {
        fn name(&self) -> Cow<'static, str> {
            self.0.into()
        }

        fn register_hook_usage(&self) -> rolldown_plugin::HookUsage {
            rolldown_plugin::HookUsage::empty()
        }
    }

    impl PhasedPlugin for Named {}

    #[derive(Debug)]
    struct Resolving;

    impl Plugin for Resolving {
        fn name(&self) -> Cow<'static, str> {
            "resolving".into()
        }

        fn register_hook_usage(&self) -> rolldown_plugin::HookUsage {
            rolldown_plugin::HookUsage::empty()
        }
    }

    impl PhasedPlugin for Resolving {
        fn phase(&self) -> PluginPhase {
            PluginPhase::Resolve
        }
    }

    #[test]
    fn test_resolve_phase_runs_first() {
        let mut registry = PluginRegistry::new();
        registry.add("t1", Named("t1"));
        registry.add("resolve", Resolving);
        registry.add("t2", Named("t2"));
        assert_eq!(registry.len(), 3);

        let names: Vec<_> = registry
            .into_rolldown_plugins()
            .iter()
            .map(|plugin| plugin.call_name().into_owned())
            .collect();
        assert_eq!(names, vec!["resolving", "t1", "t2"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = PluginRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.into_rolldown_plugins().is_empty());
    }
}
