//! Word game multiplayer server.

use scrabble_core::{GameConfig, WordList};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod protocol;
mod room;
mod server;

use server::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr: SocketAddr = std::env::var("SERVER_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()?;

    let tick_ms: u64 = std::env::var("TICK_MS")
        .unwrap_or_else(|_| "100".into())
        .parse()?;

    let dictionary = match std::env::var("DICTIONARY_PATH") {
        Ok(path) => {
            info!("Loading dictionary from {}", path);
            WordList::from_file(&path)?
        }
        Err(_) => WordList::embedded(),
    };
    info!("Dictionary holds {} words", dictionary.len());

    let state = Arc::new(ServerState::new(dictionary, GameConfig::default()));

    tokio::spawn(server::run_ticker(
        Arc::clone(&state),
        Duration::from_millis(tick_ms.max(1)),
    ));

    server::run_server(addr, state).await
}
