use axum::ServiceExt;
use axum::extract::Request;
use sea_orm::Database;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tracing::info;

use foodgram_core::config::Config;
use foodgram_core::tracing::init_tracing;

use foodgram_recipes::config::RecipesConfig;
use foodgram_recipes::router::build_router;
use foodgram_recipes::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = RecipesConfig::from_env().expect("failed to load recipes config");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState::new(db, &config);
    if let Err(e) = tokio::fs::create_dir_all(&state.media_root).await {
        tracing::warn!(error = %e, path = %state.media_root.display(), "media root not writable");
    }

    let router = build_router(state);
    let app = NormalizePathLayer::trim_trailing_slash().layer(router);

    let http_addr = format!("0.0.0.0:{}", config.recipes_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("recipes service listening on {http_addr}");
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
