//! Plugin options as they appear in a package's pipeline configuration.
//!
//! Two options accept more than one JSON shape. They are modelled as enums
//! with explicit variants instead of being inspected at call time:
//!
//! | JSON                  | [`Entrypoint`]          | [`Minify`]              |
//! |-----------------------|-------------------------|-------------------------|
//! | key absent            | `Default`               | `Default`               |
//! | `null`                | `Disabled`              | `Default`               |
//! | `"key"` / `["a","b"]` | `Keys(..)`              | n/a                     |
//! | `true` / `false`      | n/a                     | `Default` / `Disabled`  |
//! | `{ .. }`              | n/a                     | `Custom(..)`            |

use oxc_minifier::{CompressOptions, MangleOptions, MinifierOptions};
use rolldown::OutputFormat;
use rolldown_common::{RawMinifyOptions, RawMinifyOptionsDetailed};
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Explicit CommonJS named exports, keyed by module id or package name.
pub type NamedExports = BTreeMap<String, Vec<String>>;

/// Options shared by the UMD and IIFE plugins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOptions {
    /// Global variable name the bundle exposes. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Prefer the `browser` field and export condition during resolution.
    #[serde(default)]
    pub browser: bool,

    /// Explicit CommonJS named-export overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub named_exports: NamedExports,

    /// Which manifest keys advertise this bundle.
    #[serde(default, skip_serializing_if = "Entrypoint::is_default")]
    pub entrypoint: Entrypoint,

    /// Minification toggle or minifier configuration.
    #[serde(default, skip_serializing_if = "Minify::is_default")]
    pub minify: Minify,

    /// Emit source maps (default: true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcemap: Option<bool>,
}

impl BundleOptions {
    /// Create options with the given global name and every other option defaulted.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn browser(mut self, enabled: bool) -> Self {
        self.browser = enabled;
        self
    }

    pub fn entrypoint(mut self, entrypoint: Entrypoint) -> Self {
        self.entrypoint = entrypoint;
        self
    }

    pub fn minify(mut self, minify: Minify) -> Self {
        self.minify = minify;
        self
    }

    pub fn sourcemap(mut self, enabled: bool) -> Self {
        self.sourcemap = Some(enabled);
        self
    }

    /// Add a named-export override for a CommonJS module.
    pub fn named_export<I, S>(mut self, module: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.named_exports
            .entry(module.into())
            .or_default()
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// The configured global name, if present and non-empty.
    pub fn global_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// Whether source maps should be written.
    pub fn sourcemap_enabled(&self) -> bool {
        self.sourcemap.unwrap_or(true)
    }
}

/// Manifest keys that should point at the bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Entrypoint {
    /// Use the variant's default key.
    #[default]
    Default,
    /// Do not advertise the bundle in the manifest at all.
    Disabled,
    /// Use these keys, in order.
    Keys(Vec<String>),
}

impl Entrypoint {
    pub fn is_default(&self) -> bool {
        matches!(self, Entrypoint::Default)
    }

    /// A single explicit key.
    pub fn key(key: impl Into<String>) -> Self {
        Entrypoint::Keys(vec![key.into()])
    }

    /// Resolve to concrete keys, or `None` when disabled.
    pub fn resolve(&self, default_key: &str) -> Option<Vec<String>> {
        match self {
            Entrypoint::Default => Some(vec![default_key.to_string()]),
            Entrypoint::Disabled => None,
            Entrypoint::Keys(keys) => Some(keys.clone()),
        }
    }
}

impl<'de> Deserialize<'de> for Entrypoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntrypointVisitor;

        impl<'de> Visitor<'de> for EntrypointVisitor {
            type Value = Entrypoint;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("null, a manifest key, or a list of manifest keys")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Entrypoint, E> {
                Ok(Entrypoint::Disabled)
            }

            fn visit_none<E: de::Error>(self) -> Result<Entrypoint, E> {
                Ok(Entrypoint::Disabled)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Entrypoint, D::Error> {
                d.deserialize_any(self)
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Entrypoint, E> {
                Ok(Entrypoint::key(value))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Entrypoint, A::Error> {
                let mut keys = Vec::new();
                while let Some(key) = seq.next_element::<String>()? {
                    keys.push(key);
                }
                Ok(Entrypoint::Keys(keys))
            }
        }

        deserializer.deserialize_any(EntrypointVisitor)
    }
}

impl Serialize for Entrypoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Only reachable when serializing the field unconditionally.
            Entrypoint::Default => serializer.serialize_none(),
            Entrypoint::Disabled => serializer.serialize_unit(),
            Entrypoint::Keys(keys) => keys.serialize(serializer),
        }
    }
}

/// Minification setting.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Minify {
    /// Minify with the minifier's default settings.
    #[default]
    Default,
    /// Emit readable output.
    Disabled,
    /// Minify with a caller-provided configuration.
    Custom(MinifierConfig),
}

impl Minify {
    pub fn is_default(&self) -> bool {
        matches!(self, Minify::Default)
    }

    /// The minifier configuration to hand to the engine, or `None` when disabled.
    pub fn config(&self) -> Option<MinifierConfig> {
        match self {
            Minify::Default => Some(MinifierConfig::default()),
            Minify::Disabled => None,
            Minify::Custom(config) => Some(config.clone()),
        }
    }
}

impl<'de> Deserialize<'de> for Minify {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Config(MinifierConfig),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None | Some(Raw::Bool(true)) => Minify::Default,
            Some(Raw::Bool(false)) => Minify::Disabled,
            Some(Raw::Config(config)) => Minify::Custom(config),
        })
    }
}

impl Serialize for Minify {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Minify::Default => serializer.serialize_bool(true),
            Minify::Disabled => serializer.serialize_bool(false),
            Minify::Custom(config) => config.serialize(serializer),
        }
    }
}

/// Minifier configuration object.
///
/// `compress` and `mangle` are understood by the engine. Every other key is
/// kept in `extra` so the configuration round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinifierConfig {
    #[serde(default = "enabled")]
    pub compress: bool,
    #[serde(default = "enabled")]
    pub mangle: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn enabled() -> bool {
    true
}

impl Default for MinifierConfig {
    fn default() -> Self {
        Self {
            compress: true,
            mangle: true,
            extra: serde_json::Map::new(),
        }
    }
}

impl MinifierConfig {
    /// Convert to Rolldown's minification options for `format`.
    ///
    /// Each pass maps onto the matching minifier option. Top-level names are
    /// never mangled for IIFE, where the top level is the global scope.
    pub(crate) fn to_rolldown_options(&self, format: OutputFormat) -> RawMinifyOptions {
        if !self.compress && !self.mangle {
            tracing::debug!(
                "minifier config disables both compress and mangle; emitting unminified output"
            );
            return RawMinifyOptions::Bool(false);
        }

        let mangle = self.mangle.then(|| MangleOptions {
            top_level: !matches!(format, OutputFormat::Iife),
            ..MangleOptions::default()
        });
        let compress = self.compress.then(CompressOptions::smallest);

        RawMinifyOptions::Object(RawMinifyOptionsDetailed {
            options: MinifierOptions { mangle, compress },
            default_target: true,
            remove_whitespace: true,
        })
    }
}
