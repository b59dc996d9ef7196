#![deny(clippy::all, clippy::pedantic)]
//! # Lanyard Runtime
//!
//! Entry point for the `lanyard_main` binary. Log verbosity follows
//! `RUST_LOG`, defaulting to `info`.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = runtime::Args::parse();
    let summary = runtime::run(&args)?;
    tracing::info!(
        "Ran {} frames ({} physics steps) over {} chains",
        summary.frames,
        summary.steps,
        summary.chains
    );
    Ok(())
}
