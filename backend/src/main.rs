//! taskflow-backend - REST task repository
//!
//! Serves the task API consumed by the frontend's task store, plus the
//! compiled frontend bundle.

mod config;
mod error;
mod routes;
mod storage;

use std::sync::Arc;

use clap::Parser;
use taskflow_shared::SystemClock;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, StorageKind};
use crate::routes::AppState;
use crate::storage::{MemoryStorage, RedisStorage, TaskStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = Config::parse();
    let storage: Arc<dyn TaskStorage> = match config.storage {
        StorageKind::Redis => {
            info!(redis_url = %config.redis_url, "using redis storage");
            Arc::new(RedisStorage::open(&config.redis_url)?)
        }
        StorageKind::Memory => {
            info!("using in-memory storage, tasks are lost on exit");
            Arc::new(MemoryStorage::default())
        }
    };

    let app = routes::router(AppState::new(storage, Arc::new(SystemClock)))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "server running");
    axum::serve(listener, app).await?;
    Ok(())
}
