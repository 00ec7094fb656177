use clap::Parser;
use tracing_subscriber::EnvFilter;

use a3s_logroute::cli::{Cli, Commands};
use a3s_logroute::config::RouterConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let config = RouterConfig::load_with_env(cli.config.as_deref())?;
            a3s_logroute::cli::serve::execute(config, host, port).await?;
        }
        Commands::Lambda => {
            let config = RouterConfig::load_with_env(cli.config.as_deref())?;
            a3s_logroute::cli::lambda::execute(config).await?;
        }
        Commands::Send {
            url,
            level,
            message,
            details,
            source,
        } => {
            a3s_logroute::cli::send::execute(&url, &level, &message, details.as_deref(), &source)
                .await?;
        }
    }

    Ok(())
}
