//! The `muster-server` binary: configure from the environment and run.

use muster::{MusterError, MusterServer, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), MusterError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let server = MusterServer::builder().config(config).build().await?;
    let ws_addr = server.local_addr()?;
    let http_addr = server.http_addr()?;
    tracing::info!(ws = %ws_addr, http = %http_addr, "muster listening");
    server.run().await
}
