//! Metric sampling agent

use anyhow::Context;
use clap::Parser;
use metric_service::agent::Agent;
use metric_service::config::{AgentArgs, load_agent_config};
use metric_service::utils::logging;
use metric_service::utils::shutdown::shutdown_signal;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = load_agent_config(AgentArgs::parse())
        .await
        .context("loading agent configuration")?;
    logging::init(&config.logging).context("initialising logging")?;

    info!(
        "Agent polling every {}s, reporting every {}s",
        config.poll_interval, config.report_interval
    );

    let agent = Agent::from_config(&config)
        .await
        .context("building agent")?;
    agent.run(shutdown_signal()).await;

    info!("Agent stopped");
    Ok(())
}
