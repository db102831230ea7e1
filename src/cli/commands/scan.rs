//! Inventory scan command
//!
//! Merges flags over the layered configuration, fans the listing jobs out
//! over the worker pool and prints the aggregated counts.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Instant;

use crate::cli::Output;
use crate::cli::commands::setup_logging;
use crate::config::ScanpoolConfig;
use crate::inventory::{Inventory, ResourceKind, run_inventory, unique_origins};

#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    /// Directory roots to inventory (defaults to scan.origins, then ".")
    #[arg(value_name = "ORIGIN")]
    pub origins: Vec<String>,

    /// Resource kinds to list for every origin
    #[arg(long, value_enum, value_delimiter = ',')]
    pub kinds: Vec<ResourceKind>,

    /// Number of pool workers (0 derives the count from CPU cores)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Results buffered before draining
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Maximum directory depth below each origin
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Only count paths matching these globs (relative to the origin)
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Include hidden files and directories
    #[arg(long)]
    pub hidden: bool,

    /// Deadline for each listing job in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Exit with an error when any listing job fails
    #[arg(long)]
    pub fail_on_error: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize)]
pub enum OutputFormat {
    /// Styled per-origin summary
    #[default]
    Text,
    /// JSON report for machine processing
    Json,
}

impl ScanArgs {
    /// Configuration overrides for the flags that were actually given.
    ///
    /// Unset options and switches become `null` and are filtered out before
    /// merging, so they never mask file or environment values.
    pub fn overrides(&self) -> Value {
        json!({
            "fail_on_error": self.fail_on_error.then_some(true),
            "pool": {
                "workers": self.workers,
                "result_capacity": self.capacity,
            },
            "scan": {
                "origins": self.origins,
                "kinds": self.kinds,
                "max_depth": self.max_depth,
                "include": self.include,
                "hidden": self.hidden.then_some(true),
                "timeout_secs": self.timeout,
            }
        })
    }
}

#[derive(Serialize)]
struct ScanReport<'a> {
    origins: &'a [String],
    workers: usize,
    elapsed_ms: u64,
    #[serde(flatten)]
    inventory: &'a Inventory,
}

pub fn execute(
    args: ScanArgs,
    verbose: u8,
    quiet: bool,
    config_path: Option<&str>,
    output: &Output,
) -> Result<()> {
    let config = ScanpoolConfig::load(config_path, Some(args.overrides()))?;
    setup_logging(verbose, quiet, &config.log_level);
    config.validate().context("Invalid configuration")?;

    let origins = if config.scan.origins.is_empty() {
        vec![".".to_string()]
    } else {
        unique_origins(&config.scan.origins)
    };

    let started = Instant::now();
    let inventory = run_inventory(&origins, &config.scan, &config.pool)?;
    let elapsed = started.elapsed();
    inventory.log_counts();

    match args.format {
        OutputFormat::Json => {
            let report = ScanReport {
                origins: &origins,
                workers: config.pool.effective_workers(),
                elapsed_ms: elapsed.as_millis() as u64,
                inventory: &inventory,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print_summary(&inventory, &origins, &config, elapsed, output),
    }

    if config.fail_on_error && inventory.has_errors() {
        anyhow::bail!(
            "{} of {} listing jobs failed",
            inventory.errors.len(),
            inventory.results
        );
    }

    Ok(())
}

fn print_summary(
    inventory: &Inventory,
    origins: &[String],
    config: &ScanpoolConfig,
    elapsed: std::time::Duration,
    output: &Output,
) {
    output.header("Inventory");

    for origin in origins {
        let Some(kinds) = inventory.counts.get(origin) else {
            continue;
        };
        output.category(origin);
        for kind in &config.scan.kinds {
            let count = kinds.get(kind).copied().unwrap_or(0);
            output.count_row(kind.as_str(), count);
        }
    }

    for error in &inventory.errors {
        output.error(&format!("{}: {}", error.origin, error.message));
    }

    output.blank_line();
    output.verbose(&format!(
        "{} jobs on {} workers in {:.2}s",
        inventory.results,
        config.pool.effective_workers(),
        elapsed.as_secs_f64()
    ));

    if inventory.has_errors() {
        output.warning(&format!(
            "{} resources found, {} listing jobs failed",
            inventory.total(),
            inventory.errors.len()
        ));
    } else {
        output.success(&format!(
            "{} resources found across {} origins",
            inventory.total(),
            origins.len()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::overrides::filter_empty_values;

    #[test]
    fn test_unset_flags_produce_no_overrides() {
        let overrides = filter_empty_values(ScanArgs::default().overrides());
        assert_eq!(overrides, json!({}));
    }

    #[test]
    fn test_given_flags_become_overrides() {
        let args = ScanArgs {
            origins: vec!["/srv".to_string()],
            kinds: vec![ResourceKind::Symlinks],
            workers: Some(3),
            hidden: true,
            fail_on_error: true,
            ..Default::default()
        };

        let overrides = filter_empty_values(args.overrides());
        assert_eq!(
            overrides,
            json!({
                "fail_on_error": true,
                "pool": { "workers": 3 },
                "scan": { "origins": ["/srv"], "kinds": ["symlinks"], "hidden": true }
            })
        );
    }
}
