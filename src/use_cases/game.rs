use super::relay::Relay;
use super::types::GameEvent;
use std::sync::Arc;
use tokio::sync::{Notify, mpsc};
use tracing::info;

/// Drives the relay: one command at a time, in arrival order.
pub async fn relay_task(
    mut input_rx: mpsc::Receiver<GameEvent>,
    mut relay: Relay,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!(players = relay.player_count(), "relay shutting down");
                break;
            }
            event = input_rx.recv() => {
                match event {
                    Some(event) => relay.handle(event),
                    None => {
                        // Every sender is gone; nothing can reach the relay anymore.
                        info!("relay input closed");
                        break;
                    }
                }
            }
        }
    }
}
