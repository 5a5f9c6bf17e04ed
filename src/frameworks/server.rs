// Framework bootstrap for the relay server runtime.

use crate::domain::tuning::arena::ArenaTuning;
use crate::domain::tuning::player::PlayerTuning;
use crate::frameworks::config;
use crate::interface_adapters::http::index_handler;
use crate::interface_adapters::net::ws_handler;
use crate::interface_adapters::state::AppState;
use crate::use_cases::Relay;
use crate::use_cases::game::relay_task;

use axum::{Router, routing::get};
use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::{io::Result, sync::Arc};
use tokio::sync::{Notify, mpsc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let shutdown = Arc::new(Notify::new());
    // build state
    let state = build_state(shutdown.clone());
    // Start the Web Server
    let app = router(state);

    for url in reachable_urls(address) {
        tracing::info!(%url, "reachable at");
    }
    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        });

    // Stop the relay; open sockets see their outbox close and hang up.
    shutdown.notify_one();
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([0, 0, 0, 0], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state(shutdown: Arc<Notify>) -> Arc<AppState> {
    let arena = ArenaTuning::with_half_size(config::map_half_size());
    let send_timeout = config::client_send_timeout();
    tracing::debug!(
        map_half_size = arena.map_half_size,
        obstacles = arena.obstacles.len(),
        send_timeout_ms = send_timeout.as_millis(),
        "arena configured"
    );

    // Spawn the Relay Task
    // It is the only owner of the player registry.
    let (input_tx, input_rx) = mpsc::channel(config::INPUT_CHANNEL_CAPACITY);
    let relay = Relay::new(arena, PlayerTuning::default());
    tokio::spawn(relay_task(input_rx, relay, shutdown));

    Arc::new(AppState {
        input_tx,
        outbox_capacity: config::OUTBOX_CAPACITY,
        send_timeout,
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler, serve until the process is killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

/// URLs a browser can use to reach the server.
fn reachable_urls(address: SocketAddr) -> Vec<String> {
    let port = address.port();
    if !address.ip().is_unspecified() {
        return vec![format!("http://{address}")];
    }

    let mut urls = vec![format!("http://127.0.0.1:{port}")];
    if let Some(ip) = primary_lan_ip() {
        urls.push(format!("http://{ip}:{port}"));
    }
    urls
}

fn primary_lan_ip() -> Option<IpAddr> {
    // Connecting a UDP socket only selects a route; no packet is sent.
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_loopback() && !ip.is_unspecified()).then_some(ip)
}
