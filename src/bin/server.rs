//! Depot Server Binary
//!
//! Starts the TCP file-storage server.

use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use depot::network::{RayonThreadPool, Server, SharedQueueThreadPool, ThreadPool};
use depot::Config;

/// Depot Server
#[derive(Parser, Debug)]
#[command(name = "depot-server")]
#[command(about = "Networked file-storage server")]
#[command(version)]
struct Args {
    /// Directory where uploaded files are stored
    #[arg(short, long, default_value = "./depot_files")]
    storage_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6666")]
    listen: String,

    /// Number of worker threads serving connections
    #[arg(short, long, default_value = "20")]
    workers: u32,

    /// Worker pool discipline
    #[arg(short, long, value_enum, default_value = "shared-queue")]
    pool: PoolKind,

    /// Per-connection read timeout in milliseconds (0 = no timeout)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Per-connection write timeout in milliseconds (0 = no timeout)
    #[arg(long, default_value = "0")]
    write_timeout_ms: u64,
}

/// Available worker pool disciplines
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PoolKind {
    /// Fixed threads over a shared job queue
    SharedQueue,
    /// Work-stealing rayon pool
    Rayon,
}

fn main() {
    // Initialize tracing/logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,depot=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("Depot Server v{}", depot::VERSION);
    tracing::info!("Storage directory: {}", args.storage_dir);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .storage_dir(&args.storage_dir)
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    let result = match args.pool {
        PoolKind::SharedQueue => serve::<SharedQueueThreadPool>(config),
        PoolKind::Rayon => serve::<RayonThreadPool>(config),
    };

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

/// Bind and run the server with the chosen pool discipline
fn serve<P: ThreadPool>(config: Config) -> depot::Result<()> {
    let server = Server::<P>::bind(config)?;
    server.run()
}
