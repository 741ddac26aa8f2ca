//! Orbiter server binary.
//!
//! Binds the lobby server with the reference catalog and default rules.
//! The bind address comes from the first argument or `ORBITER_ADDR`,
//! falling back to `127.0.0.1:8080`.

use orbiter::OrbiterServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ORBITER_ADDR").ok())
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());

    let server = OrbiterServer::builder().bind(&addr).build().await?;
    tracing::info!(addr = %server.local_addr()?, "lobby listening");

    server.run().await?;
    Ok(())
}
