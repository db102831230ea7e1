use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::Output;
use crate::cli::commands::setup_logging;
use crate::config::ConfigLoader;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Display current merged configuration as JSON
    Show {
        /// Only show this key or section (e.g. pool, scan.kinds)
        section: Option<String>,
    },
    /// Validate the merged configuration
    Validate,
}

pub fn execute(args: ConfigArgs, custom_config: Option<&str>, output: &Output) -> Result<()> {
    let loader = ConfigLoader::load(custom_config, None)?;
    let config = loader.extract()?;
    setup_logging(0, output.is_quiet(), &config.log_level);

    match args.command {
        ConfigCommand::Show { section } => {
            let value = match section {
                Some(key) => loader.get_section(&key)?,
                None => loader.get_full_config()?,
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        ConfigCommand::Validate => {
            config.validate().context("Invalid configuration")?;
            output.success("Configuration is valid");
            output.key_value("workers", &config.pool.effective_workers().to_string());
            output.key_value("result capacity", &config.pool.result_capacity.to_string());
            output.key_value("log level", config.log_filter());
            let kinds: Vec<&str> = config.scan.kinds.iter().map(|k| k.as_str()).collect();
            output.key_value("kinds", &kinds.join(", "));
        }
    }

    Ok(())
}
