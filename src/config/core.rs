use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::ScanpoolConfig;
use super::overrides::filter_empty_values;
use super::smart_load;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

const ENV_PREFIX: &str = "SCANPOOL_";

/// Layered configuration sources, merged but not yet extracted
pub struct ConfigLoader {
    figment: Figment,
}

impl ConfigLoader {
    pub fn load(custom_config: Option<&str>, overrides: Option<Value>) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(dir) = Self::user_config_dir() {
            figment = figment
                .merge(Toml::file(dir.join("config.toml")))
                .merge(Json::file(dir.join("config.json")))
                .merge(Yaml::file(dir.join("config.yaml")))
                .merge(Yaml::file(dir.join("config.yml")));
        }

        figment = figment
            .merge(Toml::file("scanpool.toml"))
            .merge(Json::file("scanpool.json"))
            .merge(Yaml::file("scanpool.yaml"))
            .merge(Yaml::file("scanpool.yml"));

        if let Some(custom_path) = custom_config {
            if !Path::new(custom_path).is_file() {
                anyhow::bail!("Config file not found: {}", custom_path);
            }
            figment = figment.merge(smart_load::auto(custom_path));
        }

        // SCANPOOL_LOG_LEVEL beats the bare LOG_LEVEL
        figment = figment
            .merge(Env::raw().only(&["LOG_LEVEL"]))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(overrides) = overrides
            && let Value::Object(map) = filter_empty_values(overrides)
            && !map.is_empty()
        {
            tracing::trace!("command line overrides: {:?}", map);
            figment = figment.merge(Serialized::defaults(Value::Object(map)));
        }

        Ok(ConfigLoader { figment })
    }

    /// Extract the typed configuration
    pub fn extract(&self) -> Result<ScanpoolConfig> {
        self.figment
            .extract()
            .context("Failed to parse scanpool configuration")
    }

    /// Get a nested object/section as JSON
    pub fn get_section(&self, path: &str) -> Result<Value> {
        self.figment
            .extract_inner(path)
            .with_context(|| format!("Unknown configuration section '{}'", path))
    }

    /// Get the full merged configuration as a structured value
    pub fn get_full_config(&self) -> Result<Value> {
        Ok(self.figment.extract()?)
    }

    fn user_config_dir() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config").join("scanpool"))
    }
}
