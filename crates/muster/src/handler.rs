//! Per-connection handler and message router.
//!
//! Each accepted connection gets one reader loop (this module) and one
//! writer task draining the player's outbound queue. The flow:
//!
//!   1. Ban check — a denied address is closed before any player state
//!      exists: no registry entry, no broadcast.
//!   2. Allocate an identity, send `connected`.
//!   3. Loop: read a frame, decode, dispatch. Envelopes are handled one
//!      at a time; all lobby mutation happens inside a single lock
//!      acquisition per envelope.
//!   4. On any exit — clean close, transport error, idle timeout — run
//!      the disconnect cascade.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use muster_lobby::{next_player_id, Outbound, PlayerSender};
use muster_protocol::{ClientMessage, Codec, PlayerId, ServerMessage};
use muster_transport::{
    Connection, WebSocketConnection, POLICY_CLOSE_CODE,
};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::MusterError;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), MusterError> {
    let peer = conn.peer_addr();
    let conn_id = conn.id();

    if state.lobby.lock().await.is_banned(peer.ip()) {
        tracing::info!(%conn_id, %peer, "rejecting banned address");
        let _ = conn.close_with(POLICY_CLOSE_CODE, "Banned").await;
        return Ok(());
    }

    let player_id = next_player_id();
    tracing::debug!(%conn_id, %peer, %player_id, "handling connection");

    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(run_writer(conn.clone(), rx, state.codec));

    let _ = tx.send(Outbound::Message(ServerMessage::Connected {
        player_id,
        server_time: now_millis(),
    }));

    read_loop(&conn, &state, player_id, peer.ip(), &tx).await;

    // The cascade must finish (room departure, host migration or
    // teardown, registry removal, roster broadcast) before the
    // connection's resources go away.
    state.lobby.lock().await.disconnect(player_id);

    // Once the registry entry is gone, dropping our sender leaves the
    // writer with no producers and it drains out.
    drop(tx);
    let _ = writer.await;
    Ok(())
}

/// Reads and dispatches envelopes until the connection ends.
async fn read_loop(
    conn: &WebSocketConnection,
    state: &Arc<ServerState>,
    player_id: PlayerId,
    addr: IpAddr,
    sender: &PlayerSender,
) {
    loop {
        let frame = match tokio::time::timeout(
            state.config.idle_timeout,
            conn.recv(),
        )
        .await
        {
            Ok(Ok(Some(frame))) => frame,
            Ok(Ok(None)) => {
                tracing::debug!(%player_id, "connection closed cleanly");
                return;
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                return;
            }
            Err(_) => {
                tracing::info!(
                    %player_id,
                    "idle timeout, treating as disconnect"
                );
                return;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&frame) {
            Ok(msg) => msg,
            Err(e) => {
                // Malformed or unrecognized envelopes are dropped
                // silently; the connection stays open.
                tracing::debug!(
                    %player_id,
                    error = %e,
                    "dropping malformed envelope"
                );
                continue;
            }
        };

        dispatch(state, player_id, addr, msg, sender).await;
    }
}

/// Routes one inbound envelope to the lobby operation it names.
async fn dispatch(
    state: &Arc<ServerState>,
    player_id: PlayerId,
    addr: IpAddr,
    msg: ClientMessage,
    sender: &PlayerSender,
) {
    match msg {
        ClientMessage::Register { hero } => {
            state
                .lobby
                .lock()
                .await
                .register(player_id, hero, addr, sender.clone());
        }

        ClientMessage::Chat { message } => {
            state.lobby.lock().await.chat(player_id, message);
        }

        ClientMessage::CreateGame {
            game_name,
            password,
        } => {
            let result = state
                .lobby
                .lock()
                .await
                .create_game(player_id, game_name, password)
                .map(|_| ());
            report_outcome(player_id, result, sender);
        }

        ClientMessage::JoinGame { game_id, password } => {
            let result = state.lobby.lock().await.join_game(
                player_id,
                game_id,
                password.as_deref(),
            );
            report_outcome(player_id, result, sender);
        }

        ClientMessage::LeaveGame => {
            state.lobby.lock().await.leave_game(player_id);
        }

        ClientMessage::GetGames => {
            state.lobby.lock().await.send_games_list(player_id);
        }

        ClientMessage::AdminKick {
            admin_key,
            target_id,
        } => {
            if authorized(state, player_id, &admin_key) {
                state.lobby.lock().await.kick(target_id);
            }
        }

        ClientMessage::AdminBan {
            admin_key,
            target_id,
        } => {
            if authorized(state, player_id, &admin_key) {
                state.lobby.lock().await.ban(target_id);
            }
        }

        ClientMessage::AdminStats { admin_key } => {
            if authorized(state, player_id, &admin_key) {
                let stats = state.lobby.lock().await.stats();
                let _ = sender.send(Outbound::Message(
                    ServerMessage::AdminStats { stats },
                ));
            }
        }
    }
}

/// Checks the shared admin secret. A mismatch is a silent no-op toward
/// the client — no error reply, no hint whether the target exists.
fn authorized(
    state: &Arc<ServerState>,
    player_id: PlayerId,
    admin_key: &str,
) -> bool {
    if admin_key == state.config.admin_key {
        true
    } else {
        tracing::warn!(%player_id, "admin request with wrong key");
        false
    }
}

/// Sends reportable domain errors back to the requester; not-found
/// conditions stay silent.
fn report_outcome(
    player_id: PlayerId,
    result: Result<(), muster_lobby::LobbyError>,
    sender: &PlayerSender,
) {
    if let Err(e) = result {
        if e.is_reportable() {
            let _ = sender.send(Outbound::Message(ServerMessage::Error {
                message: e.to_string(),
            }));
        } else {
            tracing::debug!(%player_id, error = %e, "request was a no-op");
        }
    }
}

/// Drains a player's outbound queue into the socket.
///
/// Runs until every sender is dropped or a policy close is requested.
/// Send failures end the task — the reader loop notices the dead
/// connection on its side and triggers the cascade.
async fn run_writer(
    conn: WebSocketConnection,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    codec: muster_protocol::JsonCodec,
) {
    while let Some(event) = rx.recv().await {
        match event {
            Outbound::Message(msg) => {
                let bytes = match codec.encode(&msg) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::error!(error = %e, "encode failed");
                        continue;
                    }
                };
                if conn.send(&bytes).await.is_err() {
                    break;
                }
            }
            Outbound::Close { reason } => {
                let _ = conn
                    .close_with(POLICY_CLOSE_CODE, reason.text())
                    .await;
                break;
            }
        }
    }
}
