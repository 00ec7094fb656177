pub mod handlers;
pub mod router;
pub mod state;

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::{Result, RouterError};
use crate::router::SeverityRouter;

/// Start the HTTP server in front of `router`.
pub async fn start(config: &ServerConfig, router: SeverityRouter) -> Result<()> {
    let bind_addr = config.bind_address();
    let app = router::build(state::AppState::new(Arc::new(router)));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| RouterError::Server(format!("Failed to bind to {bind_addr}: {e}")))?;

    tracing::info!("Server listening on {bind_addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| RouterError::Server(format!("Server error: {e}")))?;

    Ok(())
}
