use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use control_core::{ControllerEvent, NodeController};
use tracing::info;

mod config;
mod sim;

use sim::SimulatedNodeProxy;

/// Drives one start -> refresh -> stop cycle against a simulated node
/// module, printing every change notification the controller emits.
#[derive(Parser, Debug)]
struct Args {
    /// TOML file overriding the built-in node configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Settling interval before the first automatic refresh, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,
    /// How long to watch for events after starting, in seconds.
    #[arg(long, default_value_t = 3)]
    watch_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let node_config = config::load_node_config(args.config.as_deref())?;
    let controller = NodeController::new_with_settle_delay(
        Arc::new(SimulatedNodeProxy::new()),
        node_config,
        Duration::from_millis(args.settle_ms),
    );

    let mut changes = controller.subscribe_changes();
    tokio::spawn(async move {
        while let Ok(change) = changes.recv().await {
            match change {
                ControllerEvent::StatusChanged(status) => println!("status: {status:?}"),
                ControllerEvent::PeersChanged(peers) => {
                    println!("peers ({}):", peers.len());
                    for peer in peers {
                        println!("  {peer}");
                    }
                }
                ControllerEvent::MetricsChanged(metrics) => println!("metrics:\n{metrics}"),
                ControllerEvent::PeersLastUpdatedChanged(at) => println!("peers updated: {at}"),
                ControllerEvent::MetricsLastUpdatedChanged(at) => println!("metrics updated: {at}"),
            }
        }
    });

    controller.start().await?;
    tokio::time::sleep(Duration::from_secs(args.watch_secs)).await;

    info!("requesting a manual refresh");
    controller.refresh_peers().await?;
    controller.refresh_metrics().await?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    controller.stop().await?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    Ok(())
}
