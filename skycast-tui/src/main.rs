//! Binary crate for the `skycast` terminal weather widget.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - The terminal event loop and rendering

use clap::Parser;

mod app;
mod backdrop;
mod cli;
mod runtime;
mod ui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}
