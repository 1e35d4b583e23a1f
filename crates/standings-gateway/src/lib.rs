//! Standings Gateway - HTTP access to the leaderboard
//!
//! A thin layer that turns HTTP requests into registry operations.
//!
//! # Architecture
//!
//! - **Config**: Environment-driven node settings
//! - **Node**: Seeds the registry and owns the shared state
//! - **API**: axum routes for leaderboard, search, lookup, stats and updates
//!
//! # Example
//!
//! ```no_run
//! use standings_gateway::{NodeConfig, StandingsNode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NodeConfig::from_env()?;
//!     let node = StandingsNode::new(config)?;
//!     node.run().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod node;

pub use api::{build_router, StatsView, UpdateResponse, UserView};
pub use config::NodeConfig;
pub use error::{Error, Result};
pub use node::{AppState, SharedState, StandingsNode};
