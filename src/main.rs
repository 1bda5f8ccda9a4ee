use axum_prometheus::PrometheusMetricLayer;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

use botanist::config::Config;
use botanist::routes::{AppState, create_router};
use botanist::space_engine::{SpaceConfig, SpacePredictor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,botanist=debug".into()),
        )
        .init();

    let config = Config::parse();
    tracing::info!("Starting classification gateway with config: {:?}", config);

    let predictor = SpacePredictor::new(SpaceConfig {
        space_url: config.space_url.clone(),
        api_name: config.api_name.clone(),
    });

    let state = AppState::new(Arc::new(predictor), config.model_name.clone());

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = create_router(state)
        .route(
            "/metrics",
            axum::routing::get(|| async move { metric_handle.render() }),
        )
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.server_address()).await?;
    tracing::info!("Server running on http://{}", config.server_address());
    tracing::info!(
        "Forwarding predictions to {}/run/{}",
        config.space_url.trim_end_matches('/'),
        config.api_name
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        tracing::info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
