//! seeklog Server Binary
//!
//! Starts the TCP server for seeklog.

use std::sync::Arc;

use clap::Parser;
use seeklog::network::Server;
use seeklog::timestamp::Timestamper;
use seeklog::{Config, LogDevice};
use tracing_subscriber::{fmt, EnvFilter};

/// seeklog Server
#[derive(Parser, Debug)]
#[command(name = "seeklog-server")]
#[command(about = "Ring-buffered command log served over TCP")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:9000")]
    listen: String,

    /// Number of commands retained before the oldest is evicted
    #[arg(short, long, default_value = "10")]
    capacity: usize,

    /// Maximum concurrent sessions
    #[arg(short, long, default_value = "128")]
    max_connections: usize,

    /// Give up waiting for the log lock after this long (0 = never)
    #[arg(long, default_value = "10000")]
    lock_timeout_ms: u64,

    /// Close sessions idle for this long (0 = never)
    #[arg(long, default_value = "30000")]
    read_timeout_ms: u64,

    /// Append a timestamp command every N seconds (0 = disabled)
    #[arg(short = 't', long, default_value = "0")]
    timestamp_interval: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,seeklog=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("seeklog Server v{}", seeklog::VERSION);
    tracing::info!("Listen address: {}", args.listen);
    tracing::info!("Capacity: {} commands", args.capacity);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .capacity(args.capacity)
        .max_connections(args.max_connections)
        .lock_timeout_ms(args.lock_timeout_ms)
        .read_timeout_ms(args.read_timeout_ms)
        .timestamp_interval_secs(args.timestamp_interval)
        .build();

    // The only fatal conditions: bad config or no memory for the ring
    let device = match LogDevice::from_config(&config) {
        Ok(d) => Arc::new(d),
        Err(e) => {
            tracing::error!("Failed to create log: {}", e);
            std::process::exit(1);
        }
    };

    let mut server = Server::new(config.clone(), Arc::clone(&device));
    if let Err(e) = server.bind() {
        tracing::error!("Failed to bind {}: {}", config.listen_addr, e);
        std::process::exit(1);
    }

    // SIGINT / SIGTERM
    let shutdown = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received SIGINT/SIGTERM, shutting down...");
        shutdown.shutdown();
    }) {
        tracing::error!("Failed to install signal handler: {}", e);
        std::process::exit(1);
    }

    if let Some(interval) = config.timestamp_interval() {
        match Timestamper::spawn(Arc::clone(&device), interval) {
            Ok(t) => server.attach_timestamper(t),
            Err(e) => {
                tracing::error!("Failed to start timestamper: {}", e);
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
