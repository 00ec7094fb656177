use crate::bootstrap;
use crate::config::RouterConfig;
use crate::error::Result;
use crate::server;

/// Execute the `serve` command: start the HTTP ingest server.
pub async fn execute(mut config: RouterConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let router = bootstrap::build_router(&config).await?;
    server::start(&config.server, router).await
}
