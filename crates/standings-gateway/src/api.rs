//! HTTP API for the standings node.
//!
//! Every handler reaches the registry through the one lock in
//! [`AppState`](crate::node::AppState). Reads take the shared side and
//! updates take the exclusive side.
//! Entries are converted to views while the guard is held, so the lock is
//! released before the response is serialized.

use crate::error::{Error, Result};
use crate::node::SharedState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use standings_registry::{Entry, Stats};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router.
pub fn build_router(state: SharedState) -> Router {
    // CORS layer for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/leaderboard", get(leaderboard))
        .route("/search", get(search))
        .route("/users/{username}", get(get_user))
        .route("/stats", get(stats))
        // The original client triggers updates with a plain GET
        .route("/update", get(update).post(update))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// An entry as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub username: String,
    pub rating: i32,
    pub rank: u32,
}

impl From<&Entry> for UserView {
    fn from(entry: &Entry) -> Self {
        Self {
            username: entry.key().to_string(),
            rating: entry.score(),
            rank: entry.rank(),
        }
    }
}

fn views(entries: Vec<&Entry>) -> Vec<UserView> {
    entries.into_iter().map(UserView::from).collect()
}

// --- Health ---

async fn health() -> &'static str {
    "OK"
}

// --- Reads ---

#[derive(Debug, Default, Deserialize)]
struct LeaderboardQuery {
    limit: Option<i64>,
}

async fn leaderboard(
    State(state): State<SharedState>,
    query: std::result::Result<Query<LeaderboardQuery>, QueryRejection>,
) -> Result<Json<Vec<UserView>>> {
    let Query(query) = query?;
    // Negative limits read as "nothing"
    let limit = match query.limit {
        Some(limit) => usize::try_from(limit).unwrap_or(0),
        None => state.config.leaderboard_size,
    };

    let registry = state.registry.read().await;
    let users = views(registry.top(limit)?);
    Ok(Json(users))
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    username: Option<String>,
}

async fn search(
    State(state): State<SharedState>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<UserView>>> {
    let Query(query) = query?;
    let needle = query.username.unwrap_or_default();

    let registry = state.registry.read().await;
    let users = views(registry.search(&needle)?);
    Ok(Json(users))
}

async fn get_user(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<Json<UserView>> {
    let registry = state.registry.read().await;
    match registry.get(&username)? {
        Some(entry) => Ok(Json(UserView::from(entry))),
        None => Err(Error::NotFound(username)),
    }
}

/// Registry summary.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsView {
    pub population: usize,
    pub top_rating: Option<i32>,
    pub bottom_rating: Option<i32>,
    pub distinct_ranks: usize,
    pub generation: u64,
}

impl From<Stats> for StatsView {
    fn from(stats: Stats) -> Self {
        Self {
            population: stats.population,
            top_rating: stats.top_score,
            bottom_rating: stats.bottom_score,
            distinct_ranks: stats.distinct_ranks,
            generation: stats.generation,
        }
    }
}

async fn stats(State(state): State<SharedState>) -> Result<Json<StatsView>> {
    let registry = state.registry.read().await;
    Ok(Json(registry.stats()?.into()))
}

// --- Writes ---

#[derive(Debug, Default, Deserialize)]
struct UpdateQuery {
    count: Option<i64>,
}

/// Update response.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub status: String,
    pub updated: usize,
    pub generation: u64,
}

async fn update(
    State(state): State<SharedState>,
    query: std::result::Result<Query<UpdateQuery>, QueryRejection>,
) -> Result<Json<UpdateResponse>> {
    let Query(query) = query?;
    let config = &state.config;
    let count = match query.count {
        Some(count) => usize::try_from(count)
            .map_err(|_| Error::InvalidInput(format!("count out of range: {}", count)))?,
        None => config.update_batch,
    };
    // Bounds how long the exclusive lock is held
    if count > config.max_update_batch {
        return Err(Error::InvalidInput(format!(
            "count {} exceeds the maximum of {}",
            count, config.max_update_batch
        )));
    }

    let mut registry = state.registry.write().await;
    registry.bulk_rerate(count, config.score_min, config.score_max)?;
    let generation = registry.generation();
    drop(registry);

    tracing::debug!(count, generation, "Ratings updated");
    Ok(Json(UpdateResponse {
        status: "ratings updated".to_string(),
        updated: count,
        generation,
    }))
}
