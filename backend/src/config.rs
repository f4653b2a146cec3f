use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Server configuration; every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "taskflow-backend", version, about = "TaskFlow task API server")]
pub struct Config {
    /// Redis connection string
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Address to listen on
    #[arg(long, env = "TASKFLOW_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Directory with the built frontend
    #[arg(long, env = "TASKFLOW_STATIC_DIR", default_value = "frontend/dist")]
    pub static_dir: PathBuf,

    /// Where tasks are kept
    #[arg(long, env = "TASKFLOW_STORAGE", value_enum, default_value_t = StorageKind::Redis)]
    pub storage: StorageKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    Redis,
    /// Process-local; for development without a Redis server
    Memory,
}
