//! SwitchMap - Main entry point
//!
//! Crawls a managed-switch network from a single seed address and
//! writes the resulting topology and inventory documents.

mod output;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use switchmap_core::Address;
use switchmap_discovery::{DiscoveryEngine, SshVendorProbe, StrategyRegistry};
use switchmap_ssh::FileCredentials;

#[derive(Parser, Debug)]
#[command(name = "switchmap")]
#[command(about = "Seed-based topology discovery for vendor-heterogeneous switch networks")]
#[command(version)]
struct Args {
    /// Seed address the crawl starts from
    seed: String,

    /// Path to the credential file
    #[arg(short, long, default_value = "credentials.toml")]
    credentials: PathBuf,

    /// Directory for the topology and inventory documents
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print the summary without writing output documents
    #[arg(long)]
    summary_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("SwitchMap v{}", env!("CARGO_PKG_VERSION"));

    // Credential loading is the only failure allowed to abort the run
    let credentials = FileCredentials::load(&args.credentials)
        .with_context(|| format!("cannot load credentials from {}", args.credentials.display()))?;
    let settings = credentials.ssh_settings().clone();

    let probe = Arc::new(SshVendorProbe::new(Arc::new(credentials), settings.clone()));
    let registry = StrategyRegistry::with_builtin(settings);
    let engine = DiscoveryEngine::new(probe, registry);

    let seed = Address::from(args.seed.as_str());
    let report = engine.crawl(seed.clone()).await;
    let summary = report.summary();

    println!(
        "Discovered {} switches, {} neighbor edges ({} failed):",
        summary.switch_count,
        summary.neighbor_edge_count,
        summary.failed.len()
    );
    for address in &summary.discovered {
        if let Some(switch) = report.topology.get(address) {
            println!(
                "  - {} ({}, {} neighbors)",
                address,
                switch.vendor,
                switch.neighbors.len()
            );
        }
    }
    if !summary.failed.is_empty() {
        println!("Failed addresses:");
        for address in &summary.failed {
            println!("  - {}", address);
        }
    }

    if !args.summary_only {
        let topology_path =
            output::write_topology(&args.output_dir, &seed, &report.topology)?;
        let inventory_path = output::update_inventory(&args.output_dir, &report.topology)?;
        info!(
            topology = %topology_path.display(),
            inventory = %inventory_path.display(),
            "Results written"
        );
    }

    Ok(())
}
