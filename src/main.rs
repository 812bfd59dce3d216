use std::sync::Arc;

use anyhow::Context;
use junggu_guide::{
    api::{create_router, AppState},
    config::Config,
    dataset::{DataSources, DatasetCache},
    services::{OpenAiProvider, SessionStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; forwarded questions will get an error reply");
    }

    // No partial-dataset fallback: a bad source aborts startup
    let cache = DatasetCache::new(DataSources::from(&config));
    let dataset = cache
        .get()
        .await
        .context("Failed to load place datasets")?;

    tracing::info!(
        places = dataset.len(),
        categories = dataset.categories().len(),
        "Dataset ready"
    );

    let provider = Arc::new(OpenAiProvider::from_config(&config));
    let sessions =
        SessionStore::with_idle_timeout(chrono::Duration::minutes(config.session_idle_minutes));
    let state = AppState::new(cache, provider).with_sessions(sessions);
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
