//! Read-only HTTP companion surface.
//!
//! Two endpoints for dashboards and the lobby browser's polling
//! fallback; everything else happens over the WebSocket.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use muster_protocol::RoomSummary;
use serde::Serialize;

use crate::server::ServerState;

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    players: usize,
    games: usize,
}

#[derive(Debug, Serialize)]
struct GamesBody {
    games: Vec<RoomSummary>,
}

/// Builds the companion router.
///
/// Routes:
/// - GET /health → `{status, players, games}`
/// - GET /api/games → `{games: [RoomSummary]}`
pub(crate) fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/games", get(games))
        .with_state(state)
}

async fn health(
    State(state): State<Arc<ServerState>>,
) -> Json<HealthBody> {
    let lobby = state.lobby.lock().await;
    Json(HealthBody {
        status: "ok",
        players: lobby.player_count(),
        games: lobby.game_count(),
    })
}

async fn games(
    State(state): State<Arc<ServerState>>,
) -> Json<GamesBody> {
    let lobby = state.lobby.lock().await;
    Json(GamesBody {
        games: lobby.games(),
    })
}
