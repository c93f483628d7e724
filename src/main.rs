use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use udprip::runtime::Router;

/// A single node of the UDPRIP distance-vector routing protocol.
#[derive(Debug, Parser)]
#[command(name = "udpripd")]
struct Args {
    /// Address this node listens and advertises as.
    self_address: String,

    /// Seconds between advertisement ticks; keep-alive expiry is 4x this.
    period_seconds: f64,

    /// Optional file of operator commands run once at startup.
    startup_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if !args.period_seconds.is_finite() || args.period_seconds <= 0.0 {
        bail!(
            "period_seconds must be a finite positive number, got {}",
            args.period_seconds
        );
    }
    let period = Duration::from_secs_f64(args.period_seconds);

    let mut router = Router::new(args.self_address, period)
        .context("failed to bind udprip transport")?;

    if let Some(path) = &args.startup_file {
        router
            .load_startup_file(path)
            .with_context(|| format!("failed to load startup file {}", path.display()))?;
    }

    router.run_forever()
}
