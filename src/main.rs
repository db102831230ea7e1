use anyhow::Result;
use clap::Parser;

use scanpool::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
