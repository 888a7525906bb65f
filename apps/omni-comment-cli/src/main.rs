//! omni-comment CLI.
//!
//! Entry point for the omni-comment tool. Parses CLI arguments, initializes
//! tracing, and hands the invocation to the core engine.

mod cli;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_tracing();
    cli.run().await
}
