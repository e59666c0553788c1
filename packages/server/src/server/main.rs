// Main entry point for API server

use anyhow::{Context, Result};
use seoul_openapi::{ClientOptions, SeoulOpenApiClient, TOILET_POI_SERVICE};
use server_core::{
    kernel::ServerDeps,
    server::{build_app, AxumAppState},
    Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Seoul toilet map API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        page_size = config.page_size,
        max_pages = config.max_pages,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "Configuration loaded"
    );

    let options = ClientOptions::new(config.seoul_key.clone(), TOILET_POI_SERVICE)
        .with_base_url(config.seoul_api_base.clone())
        .with_timeout(config.upstream_timeout);
    let client =
        SeoulOpenApiClient::with_options(options).context("Failed to build Seoul API client")?;

    // Build application
    let deps = ServerDeps::seoul(client);
    let state = AxumAppState::new(&deps, config.aggregation());
    let app = build_app(state, Some(&config.static_dir));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
