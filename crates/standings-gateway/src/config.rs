//! Node configuration.

use crate::error::{Error, Result};
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

/// Port used when neither `STANDINGS_API_ADDR` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 8080;

/// Configuration for a standings node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// HTTP API listen address
    pub api_addr: SocketAddr,

    /// Entries created at startup
    pub seed_count: usize,

    /// Lowest score handed out by seeding and updates
    pub score_min: i32,

    /// Highest score handed out by seeding and updates
    pub score_max: i32,

    /// Entries re-rated by an update request without an explicit count
    pub update_batch: usize,

    /// Upper bound on the count of a single update request
    pub max_update_batch: usize,

    /// Entries returned by the leaderboard without an explicit limit
    pub leaderboard_size: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            api_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            seed_count: 10_000,
            score_min: 100,
            score_max: 5000,
            update_batch: 200,
            max_update_batch: 10_000,
            leaderboard_size: 100,
        }
    }
}

impl NodeConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_addr = match lookup("STANDINGS_API_ADDR") {
            Some(addr) => parse("STANDINGS_API_ADDR", &addr)?,
            None => {
                let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let config = Self {
            api_addr,
            seed_count: parse_or(&lookup, "STANDINGS_SEED_COUNT", defaults.seed_count)?,
            score_min: parse_or(&lookup, "STANDINGS_SCORE_MIN", defaults.score_min)?,
            score_max: parse_or(&lookup, "STANDINGS_SCORE_MAX", defaults.score_max)?,
            update_batch: parse_or(&lookup, "STANDINGS_UPDATE_BATCH", defaults.update_batch)?,
            max_update_batch: parse_or(
                &lookup,
                "STANDINGS_MAX_UPDATE_BATCH",
                defaults.max_update_batch,
            )?,
            leaderboard_size: parse_or(
                &lookup,
                "STANDINGS_LEADERBOARD_SIZE",
                defaults.leaderboard_size,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the score range and update batch bounds are well formed.
    pub fn validate(&self) -> Result<()> {
        if self.score_min > self.score_max {
            return Err(Error::Config(format!(
                "score range is inverted: {} > {}",
                self.score_min, self.score_max
            )));
        }
        if self.update_batch > self.max_update_batch {
            return Err(Error::Config(format!(
                "update batch {} exceeds maximum {}",
                self.update_batch, self.max_update_batch
            )));
        }
        Ok(())
    }
}

fn parse<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("invalid {} {:?}: {}", name, raw, e)))
}

fn parse_or<T, F>(lookup: &F, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => parse(name, &raw),
        None => Ok(default),
    }
}
