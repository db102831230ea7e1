//! Command-line interface for scanpool
//!
//! clap derive parsing, logging setup and command dispatch.

pub mod commands;
pub mod output;

pub use commands::{Cli, Commands};
pub use output::Output;
