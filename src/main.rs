use anyhow::Context;
use tracing_subscriber::EnvFilter;

use monk_jsonapi::config;
use monk_jsonapi::fixture::Fixture;
use monk_jsonapi::{router, AppState, ServeOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up MONK_FIXTURE_PATH, APP_ENV, etc.
    let _ = dotenvy::dotenv();

    let config = config::config();

    // RUST_LOG wins; otherwise query debugging turns on this crate's debug output
    let default_filter = if config.query.debug_logging { "info,monk_jsonapi=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    tracing::info!("Starting monk-jsonapi in {:?} mode", config.environment);

    let fixture_path = config
        .api
        .fixture_path
        .as_deref()
        .context("MONK_FIXTURE_PATH must point at a fixture file")?;
    let fixture = Fixture::load(fixture_path)?;

    let app = router(AppState::from_fixture(fixture, ServeOptions::from_config(config)));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("monk-jsonapi listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
