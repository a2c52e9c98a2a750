use anyhow::{Context, Result};
use tandem_server::{RelayConfig, SignalingService, router};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RelayConfig::from_env().context("Failed to read relay configuration")?;

    let service = SignalingService::spawn(config.command_buffer);
    let app = router(service);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Signaling relay listening on http://{}", addr);

    axum::serve(listener, app).await.context("Relay server failed")?;
    Ok(())
}
