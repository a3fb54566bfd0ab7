//! Binary entry point for the vector gateway.

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vector_gateway::{server, Dependencies, GatewayConfig, ServerError};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let config = GatewayConfig::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting vector gateway"
    );

    let deps = Dependencies::new(&config).await?;

    server::run(&config, deps).await
}
