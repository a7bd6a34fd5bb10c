//! Web server module

mod admin;
mod analytics;
mod middleware;
mod routes;
mod seo;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::Config;
use crate::db::Database;
use crate::video::probe::Probe;

pub struct AppState {
    pub db: Database,
    pub probe: Arc<dyn Probe>,
    pub config: Arc<Config>,
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/videos", get(routes::list_videos).post(routes::create_video))
        .route("/videos/:id", get(routes::get_video).delete(routes::delete_video))
        .route("/videos/:id/embed", get(routes::embed_video))
        .route("/resolve", get(routes::resolve_url))
        .route("/admin/login", post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .route("/analytics", get(analytics::report).post(analytics::track))
        .route("/analytics/visitors", get(analytics::visitors));

    Router::new()
        .nest("/api", api)
        .route("/robots.txt", get(seo::robots))
        .route("/sitemap.xml", get(seo::sitemap))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(middleware::RequestLoggingLayer::new())
        .with_state(state)
}

pub async fn start_server(config: Arc<Config>, db: Database, probe: Arc<dyn Probe>) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.http_port);
    let state = Arc::new(AppState { db, probe, config });
    let app = router(state);

    info!("Web server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
