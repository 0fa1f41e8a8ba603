// FinStart - Web Server
// Proxies the bank locator for the single-page app

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finstart::api::{router, AppState};
use finstart::{BankLocator, Config, SerpApiClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finstart=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let api_key = config.require_api_key()?;

    let client = SerpApiClient::new(&config.search_base_url, api_key, config.upstream_timeout)?;
    let state = AppState {
        locator: BankLocator::new(Arc::new(client)),
    };

    let app = router(state, &config.frontend_origin)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("🚀 Server running at http://localhost:{}", config.port);
    tracing::info!("   CORS origin: {}", config.frontend_origin);

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
