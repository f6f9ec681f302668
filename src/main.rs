use expense_views::{router, AppState, ExpenseApi, Settings, StaticToken};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let settings = Settings::from_env();
    let api = ExpenseApi::new(&settings.api_base_url)?;
    if settings.access_token.is_none() {
        warn!("EXPENSE_API_TOKEN is not set; upstream requests are sent without credentials");
    }

    info!("using expense API at {}", api.base_url());
    let state = AppState::new(
        api,
        Arc::new(StaticToken::new(settings.access_token)),
        settings.colors,
    );
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
