//! Standings node binary
//!
//! Seeds an in-memory leaderboard and serves it over HTTP.

use standings_gateway::{NodeConfig, StandingsNode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "standings_node=info,standings_gateway=info,standings_registry=info,tower_http=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting standings node");

    let config = NodeConfig::from_env()?;

    let node = StandingsNode::new(config)?;
    node.run().await?;

    Ok(())
}
