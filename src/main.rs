/*!
 * ORB Monitor Agent - Main Entry Point
 *
 * Standalone delivery process: resolves configuration from `-Dkey=value`
 * arguments, the environment and `monitor.properties`, checks the collector
 * and runs the delivery pipeline until Ctrl+C.
 */

use anyhow::Context;
use orb_monitor::config::properties_from_args;
use orb_monitor::{init_tracing, Agent, HttpTransport, MonitorConfig, Transport};
use std::sync::Arc;
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let properties = properties_from_args(std::env::args().skip(1));
    let config = MonitorConfig::load(properties).context("Failed to load monitor configuration")?;

    // The blocking HTTP client must be built and dropped outside any async runtime
    let transport: Arc<dyn Transport> =
        Arc::new(HttpTransport::new(&config).context("Failed to build collector client")?);
    let agent = Agent::start(config, transport, None).context("Failed to start monitor agent")?;

    if agent.health_check() {
        info!(api = %agent.config().api_base_url, "Collector reachable");
    } else {
        warn!(api = %agent.config().api_base_url, "Collector not reachable, events will be counted as failed until it is");
    }

    info!("Monitor agent running, press Ctrl+C to exit");
    let signals = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;
    signals
        .block_on(tokio::signal::ctrl_c())
        .context("Failed to listen for Ctrl+C")?;
    drop(signals);

    agent.shutdown();
    Ok(())
}
