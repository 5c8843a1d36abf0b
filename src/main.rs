//! Edge Request Normalizer
//!
//! An edge service in front of a static content origin.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                      EDGE                        │
//!   Client Request    │  ┌─────────┐    ┌────────────┐                   │
//!   ──────────────────┼─▶│  http   │───▶│ normalizer │──┐                │
//!                     │  │ server  │    └────────────┘  │                │
//!                     │  └─────────┘                    │                │
//!   301 redirect      │       ▲          redirect       │                │
//!   ◀─────────────────┼───────┴─────────────────────────┤                │
//!                     │                  rewrite /      ▼                │
//!                     │                  pass through ┌────────┐         │
//!   Origin Response   │                               │ origin │─────────┼──▶ Static
//!   ◀─────────────────┼───────────────────────────────│ client │◀────────┼─── Origin
//!                     │                               └────────┘         │
//!                     │  config · observability · resilience · telemetry │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "edge-normalizer", version)]
#[command(about = "Edge path normalizer in front of a static content origin", long_about = None)]
struct Args {
    /// Path to the TOML configuration file (defaults are used when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    edge_normalizer::lifecycle::startup::run(args.config.as_deref()).await?;
    Ok(())
}
