use crate::use_cases::GameEvent;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct AppState {
    // Commands flowing from sockets into the relay task.
    pub input_tx: mpsc::Sender<GameEvent>,
    // Capacity of each connection's outbound event queue.
    pub outbox_capacity: usize,
    // Upper bound for one socket write before the client is dropped.
    pub send_timeout: Duration,
}
