//! # Muster
//!
//! A transient, in-memory multiplayer lobby: players connect over a
//! WebSocket, advertise a hero, create or join short-lived game rooms,
//! chat, and are subject to kick/ban moderation. Muster brokers pre-game
//! discovery and session membership only — the companion client runs the
//! actual game.
//!
//! The layers, bottom to top: `muster-transport` (sockets),
//! `muster-protocol` (envelopes), `muster-lobby` (the coordinator with
//! the real invariants), and this crate, which ties them together behind
//! a server builder plus a read-only HTTP companion surface.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use muster::{MusterServer, ServerConfig};
//!
//! # async fn run() -> Result<(), muster::MusterError> {
//! let server = MusterServer::builder()
//!     .config(ServerConfig::from_env())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod http;
mod server;

pub use config::{ServerConfig, DEFAULT_ADMIN_KEY};
pub use error::MusterError;
pub use server::{MusterServer, MusterServerBuilder};
