use std::env;

use anyhow::Result;
use riquer_api::build_app;
use riquer_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("riquer_api");

    let kb_root = env::var("RIQUER_CONTEXT_ROOT").unwrap_or_else(|_| "kb".to_string());
    let bind = env::var("RIQUER_BIND").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

    let app = build_app(&kb_root).await?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, kb_root = %kb_root, "riquer assistant api started");

    axum::serve(listener, app).await?;
    Ok(())
}
