//! Configuration management for scanpool
//!
//! Values are layered with figment, lowest priority first:
//!
//! 1. Embedded `default-config.toml`
//! 2. User config: `~/.config/scanpool/config.{toml,json,yaml,yml}`
//! 3. Repository config: `scanpool.{toml,json,yaml,yml}`
//! 4. A file passed with `--config` (format chosen by extension)
//! 5. `LOG_LEVEL`, then `SCANPOOL_*` environment variables (`__` separates sections)
//! 6. Command line flags

pub mod core;
pub mod overrides;
pub mod smart_load;

pub use self::core::ConfigLoader;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::inventory::ScanSettings;
use crate::pool::PoolConfig;

/// Fully merged scanpool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanpoolConfig {
    /// Log level used when neither `RUST_LOG` nor `-v` is given
    pub log_level: String,

    /// Exit non-zero when any listing job reports an error
    pub fail_on_error: bool,

    /// Worker pool sizing
    pub pool: PoolConfig,

    /// What to inventory
    pub scan: ScanSettings,
}

impl Default for ScanpoolConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            fail_on_error: false,
            pool: PoolConfig::default(),
            scan: ScanSettings::default(),
        }
    }
}

impl ScanpoolConfig {
    /// Load and extract the layered configuration
    pub fn load(custom_config: Option<&str>, overrides: Option<serde_json::Value>) -> Result<Self> {
        ConfigLoader::load(custom_config, overrides)?.extract()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if parse_log_level(&self.log_level).is_none() {
            anyhow::bail!(
                "log_level must be one of trace, debug, info, warn, error or off, got '{}'",
                self.log_level
            );
        }
        self.pool.validate()?;
        self.scan.validate()?;
        Ok(())
    }

    /// Filter directive for the configured log level, `warn` when unrecognised
    pub fn log_filter(&self) -> &'static str {
        parse_log_level(&self.log_level).unwrap_or("warn")
    }
}

/// Map a log level name onto a tracing filter directive.
///
/// Accepts the usual level names case-insensitively, plus `warning`,
/// `fatal` and `panic` as they appear in `LOG_LEVEL` values of other tools.
pub fn parse_log_level(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "fatal" | "panic" => Some("error"),
        "off" => Some("off"),
        _ => None,
    }
}
