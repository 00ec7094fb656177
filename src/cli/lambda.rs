use crate::bootstrap;
use crate::config::RouterConfig;
use crate::error::{Result, RouterError};
use crate::lambda;

/// Execute the `lambda` command: serve invocations from the Lambda runtime.
pub async fn execute(config: RouterConfig) -> Result<()> {
    let router = bootstrap::build_router(&config).await?;
    lambda::run(router)
        .await
        .map_err(|e| RouterError::Server(format!("Lambda runtime error: {e}")))
}
