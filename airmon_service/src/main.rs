//! Air Quality Service - HTTP API
//!
//! Accepts PM2.5/PM10 (plus optional CO2, temperature, humidity) readings,
//! computes the CPCB AQI, stores them, and serves the latest reading and
//! recent history.
//!
//! Usage:
//!   cargo run --release                          # Port and database from airmon.toml / env
//!   cargo run --release -- --port 9000           # Override port
//!   cargo run --release -- --in-memory           # No database; readings kept in memory
//!
//! Environment:
//!   DATABASE_URL - PostgreSQL connection string
//!   HOST, PORT, WORKERS - override airmon.toml
//!   RUST_LOG - log filter (default: info)

use airmon_service::config::ServiceConfig;
use airmon_service::db::DbConfigError;
use airmon_service::endpoint::{self, AppState};
use airmon_service::store::{MemoryStore, PostgresStore, ReadingStore};
use std::env;
use std::error::Error;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct Args {
    port: Option<u16>,
    in_memory: bool,
}

fn usage(program: &str) -> String {
    format!("Usage: {} [--port PORT] [--in-memory]", program)
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("airmon_service");
    let mut parsed = Args { port: None, in_memory: false };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| format!("--port requires a port number\n{}", usage(program)))?;
                parsed.port = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid port '{}'\n{}", value, usage(program)))?,
                );
                i += 2;
            }
            "--in-memory" => {
                parsed.in_memory = true;
                i += 1;
            }
            other => {
                return Err(format!("Unknown argument: {}\n{}", other, usage(program)));
            }
        }
    }

    Ok(parsed)
}

fn open_store(config: &ServiceConfig, in_memory: bool) -> Result<Box<dyn ReadingStore>, DbConfigError> {
    if in_memory {
        tracing::warn!("using in-memory store; readings are lost on exit");
        return Ok(Box::new(MemoryStore::new()));
    }

    let url = config
        .database_url
        .as_deref()
        .ok_or(DbConfigError::MissingDatabaseUrl)?;
    let store = PostgresStore::open(url)?;
    tracing::info!("connected to PostgreSQL, air.readings verified");
    Ok(Box::new(store))
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;

    let mut config = ServiceConfig::load()?;
    if let Some(port) = args.port {
        config.port = port;
    }

    let store = open_store(&config, args.in_memory)?;
    let state = AppState::new(store, config.database_url.is_some());

    let server = Arc::new(endpoint::bind(&config.bind_address())?);
    {
        let server = Arc::clone(&server);
        ctrlc::set_handler(move || {
            tracing::info!("got SIGINT, stopping HTTP server");
            server.unblock();
        })?;
    }

    tracing::info!(
        "listening on http://{} with {} workers",
        config.bind_address(),
        config.workers
    );
    endpoint::serve(&server, &state, config.workers);

    match state.into_store() {
        Some(store) => {
            store.close()?;
            tracing::info!("store closed");
        }
        None => tracing::warn!("store still referenced at shutdown; not closed explicitly"),
    }

    tracing::info!("shut down");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        tracing::error!("{}", e);
        eprintln!("\n❌ {}\n", e);
        std::process::exit(1);
    }
}
