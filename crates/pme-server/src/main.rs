use anyhow::Context;
use clap::{value_parser, Arg, Command};
use pme_server::{routes, telemetry, AppState, LogFormat, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Command::new("pme-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Financial health diagnostic and sector benchmarks for small businesses")
        .arg(
            Arg::new("bind")
                .long("bind")
                .value_parser(value_parser!(SocketAddr))
                .help("Address to listen on (default 127.0.0.1:8080, env PME_BIND)"),
        )
        .arg(
            Arg::new("benchmarks")
                .long("benchmarks")
                .value_parser(value_parser!(PathBuf))
                .help("JSON benchmark dataset (env PME_BENCHMARKS)"),
        )
        .arg(
            Arg::new("max-body-bytes")
                .long("max-body-bytes")
                .value_parser(value_parser!(usize))
                .help("Largest accepted request body (env PME_MAX_BODY_BYTES)"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_parser(["text", "json"])
                .help("Log output format (env PME_LOG_FORMAT)"),
        );

    let matches = cli.get_matches();

    let mut config = ServerConfig::from_env()?;
    if let Some(addr) = matches.get_one::<SocketAddr>("bind") {
        config = config.with_bind_addr(*addr);
    }
    if let Some(path) = matches.get_one::<PathBuf>("benchmarks") {
        config = config.with_benchmarks_path(path.clone());
    }
    if let Some(limit) = matches.get_one::<usize>("max-body-bytes") {
        config = config.with_max_body_bytes(*limit);
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config = config.with_log_format(format.parse::<LogFormat>().map_err(anyhow::Error::msg)?);
    }

    telemetry::init(config.log_format);
    run(config).await
}

async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let benchmarks = config
        .load_benchmarks()
        .context("loading benchmark dataset")?;
    if benchmarks.is_empty() {
        tracing::info!("No benchmark dataset configured; lookups will report no curated data");
    }
    if config.api_key.is_none() {
        tracing::warn!("API_KEY is not set; every diagnostic request will be rejected");
    }

    let state = Arc::new(AppState::new(&config, Arc::new(benchmarks)));
    let (addr, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(config.bind_addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .with_context(|| format!("binding {}", config.bind_addr))?;

    tracing::info!(engine = pme_core::VERSION, "PME diagnostic server listening on {}", addr);
    server.await;
    tracing::info!("Server stopped");
    Ok(())
}
