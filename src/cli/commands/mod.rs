use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};

pub mod config;
pub mod scan;

use crate::cli::Output;
use crate::config::parse_log_level;

#[derive(Parser)]
#[command(
    name = "scanpool",
    version = env!("CARGO_PKG_VERSION"),
    about = "Fan out directory inventory jobs over a worker pool and aggregate the counts",
    long_about = "scanpool lists files, directories and symlinks below one or more origins. \
                  Every origin and resource kind is an independent job run on a bounded \
                  worker pool; results are counted per origin once every job has reported."
)]
pub struct Cli {
    /// Run as if started in <DIR> instead of current working directory
    #[arg(short = 'C', long = "directory", global = true)]
    pub directory: Option<String>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inventory resources below one or more origins
    Scan(scan::ScanArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        // Change directory if specified
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)
                .with_context(|| format!("Failed to change directory to {}", dir))?;
        }

        let output = Output::new(self.verbose > 0, self.quiet);

        match self.command {
            Some(Commands::Scan(args)) => {
                scan::execute(args, self.verbose, self.quiet, self.config.as_deref(), &output)
            }
            Some(Commands::Config(args)) => config::execute(args, self.config.as_deref(), &output),
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set, then `-v` counts, then the configured level.
/// `--quiet` installs nothing.
pub fn setup_logging(verbose: u8, quiet: bool, configured: &str) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(verbosity_filter(verbose, configured))
    });

    // A subscriber may already be installed when commands run inside one process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(verbose >= 2)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Filter directives for a `-v` count, falling back to the configured level
pub fn verbosity_filter(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => parse_log_level(configured).unwrap_or("warn").to_string(),
        1 => "info,ignore=warn,globset=warn".to_string(),
        2 => "debug,ignore=warn,globset=warn".to_string(),
        _ => "trace".to_string(), // -vvv shows everything including the walker
    }
}
