//! # audita-server Entry Point
//!
//! Initializes tracing, wires the service graph, and serves the router.

use clap::Parser;

use audita_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = audita_api::config::ServerConfig::parse();
    let state = AppState::new(&config.evidence_dir);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(bind = %config.bind, "audita-server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
