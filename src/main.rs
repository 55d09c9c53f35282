use std::sync::Arc;

use taskflow::{
    routes::create_router,
    state::{AppState, Config},
    store::create_store,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,taskflow=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);
    let store = create_store(&config)?;
    let state = AppState::new(config.clone(), store);

    // Timers that were running at the last shutdown pick up where they left off
    match state.task_service.all().await {
        Ok(tasks) => {
            let resumed = state.timers.resume_running(&tasks);
            if resumed > 0 {
                tracing::info!("Resumed {} running timer(s)", resumed);
            }
        }
        Err(e) => tracing::warn!("Could not load tasks to resume timers: {}", e),
    }

    let timers = state.timers.clone();
    let app = create_router(state);

    let addr = config.addr();
    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down, stopping timers");
            timers.stop_all();
        })
        .await?;

    Ok(())
}
