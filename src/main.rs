//! Virallink - video-link aggregation backend
//!
//! Serves a searchable, paginated catalog of externally hosted videos
//! (YouTube, Vimeo, Dailymotion) with:
//! - Link normalization into embed and thumbnail URLs
//! - Password-gated admin catalog management
//! - Page-visit tracking with daily rollups

mod analytics;
mod auth;
mod catalog;
mod config;
mod db;
mod error;
mod paging;
mod video;
mod web;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before any other initialization)
    let _ = dotenvy::dotenv();

    let config = Arc::new(config::Config::load()?);

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_lowercase()));

    // Use LOG_FORMAT=gcp for structured GCP Cloud Logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "gcp" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .init();
    }

    info!("Starting Virallink...");
    info!("Configuration loaded");

    let db = db::Database::new(&config.database).await?;
    db.run_migrations().await?;
    info!("Database initialized ({} videos in catalog)", db.count_videos().await?);

    let probe = Arc::new(video::probe::HttpProbe::new(&config.thumbnails)?);
    info!(
        "Thumbnail prober ready (timeout {}s per probe)",
        config.thumbnails.probe_timeout_secs
    );

    web::start_server(config, db, probe).await?;

    Ok(())
}
