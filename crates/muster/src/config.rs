//! Server configuration.

use std::time::Duration;

/// Built-in admin key used when none is configured. Operators must
/// override it — the server logs a warning at startup if they haven't.
pub const DEFAULT_ADMIN_KEY: &str = "muster-admin-2026";

const DEFAULT_WS_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:3001";
const DEFAULT_IDLE_SECS: u64 = 300;

/// Configuration for a Muster server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub ws_addr: String,

    /// Address the read-only HTTP companion surface binds to.
    pub http_addr: String,

    /// Shared secret gating kick/ban/stats.
    pub admin_key: String,

    /// How long a connection may stay silent before it is treated as
    /// dropped and the disconnect cascade runs.
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ws_addr: DEFAULT_WS_ADDR.to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            admin_key: DEFAULT_ADMIN_KEY.to_string(),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_SECS),
        }
    }
}

impl ServerConfig {
    /// Reads configuration from the environment, falling back to
    /// defaults for anything unset:
    ///
    /// - `MUSTER_ADDR` — WebSocket bind address
    /// - `MUSTER_HTTP_ADDR` — HTTP bind address
    /// - `MUSTER_ADMIN_KEY` — admin secret
    /// - `MUSTER_IDLE_SECS` — idle timeout in seconds
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let idle_secs = std::env::var("MUSTER_IDLE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_IDLE_SECS);
        Self {
            ws_addr: std::env::var("MUSTER_ADDR")
                .unwrap_or(defaults.ws_addr),
            http_addr: std::env::var("MUSTER_HTTP_ADDR")
                .unwrap_or(defaults.http_addr),
            admin_key: std::env::var("MUSTER_ADMIN_KEY")
                .unwrap_or(defaults.admin_key),
            idle_timeout: Duration::from_secs(idle_secs),
        }
    }

    /// Whether the admin key was left at the built-in default.
    pub fn uses_default_admin_key(&self) -> bool {
        self.admin_key == DEFAULT_ADMIN_KEY
    }
}
