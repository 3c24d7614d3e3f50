//! Loading [`BundleOptions`] from files.
//!
//! Two sources are supported:
//! - a standalone options file (`.json` or `.toml`), layered over the
//!   defaults with figment;
//! - the `@pika/pack` pipeline of a `package.json`, where each entry is
//!   `[pluginId]` or `[pluginId, { ...options }]`.

use figment::{
    Figment,
    providers::{Format as _, Json, Serialized, Toml},
};
use serde_json::Value;
use std::path::Path;

use crate::options::BundleOptions;
use crate::{Error, Result};

/// `package.json` key holding the pipeline configuration.
pub const PIPELINE_KEY: &str = "@pika/pack";

impl BundleOptions {
    /// Load options from a JSON or TOML file over the built-in defaults.
    ///
    /// The format is picked from the file extension; anything other than
    /// `.toml` is read as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::InvalidOptions(format!(
                "options file '{}' does not exist",
                path.display()
            )));
        }

        let mut figment = Figment::new().merge(Serialized::defaults(BundleOptions::default()));
        figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => figment.merge(Toml::file(path)),
            _ => figment.merge(Json::file(path)),
        };

        figment
            .extract()
            .map_err(|e| Error::InvalidOptions(format!("{}: {}", path.display(), e)))
    }

    /// Read the options of `plugin_id` from a `package.json` pipeline.
    pub fn from_package_json(path: impl AsRef<Path>, plugin_id: &str) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let manifest: Value = serde_json::from_str(&contents)
            .map_err(|e| Error::InvalidOptions(format!("{}: {}", path.display(), e)))?;

        Self::from_pipeline(&manifest, plugin_id)
    }

    /// Find `plugin_id` in an already parsed manifest.
    pub fn from_pipeline(manifest: &Value, plugin_id: &str) -> Result<Self> {
        let pipeline = manifest
            .get(PIPELINE_KEY)
            .and_then(|pack| pack.get("pipeline"))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                Error::InvalidOptions(format!("no \"{PIPELINE_KEY}\".pipeline array in manifest"))
            })?;

        let entry = pipeline
            .iter()
            .filter_map(Value::as_array)
            .find(|entry| entry.first().and_then(Value::as_str) == Some(plugin_id))
            .ok_or_else(|| {
                Error::InvalidOptions(format!("plugin '{plugin_id}' is not in the pipeline"))
            })?;

        match entry.get(1) {
            None => Ok(BundleOptions::default()),
            Some(options) => serde_json::from_value(options.clone())
                .map_err(|e| Error::InvalidOptions(format!("{plugin_id}: {e}"))),
        }
    }
}
