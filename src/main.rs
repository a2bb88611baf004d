use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use agenda::config::AppConfig;
use agenda::routes;
use agenda::services::calendar::gateway_from_config;
use agenda::services::nlp::PhraseDateResolver;
use agenda::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let calendar = gateway_from_config(&config)?;
    tracing::info!(
        calendar_id = %config.calendar_id,
        timezone = %config.calendar_timezone,
        utc_offset_minutes = config.utc_offset_minutes,
        "calendar gateway ready"
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        calendar: Box::new(calendar),
        resolver: Box::new(PhraseDateResolver),
    });

    let app = routes::router(state).layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
