// Live connection table and best-effort fan-out.

use super::types::{Audience, Outbox, ServerEvent};
use crate::domain::ConnectionId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Outcome counters for one fan-out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    pub dropped: usize,
}

/// Maps connection ids to their outbound queues.
///
/// Sends never wait: a full queue drops the event for that one connection so a
/// stalled client cannot hold up the others or the registry.
#[derive(Debug, Default)]
pub struct ConnectionTable {
    outboxes: HashMap<ConnectionId, Outbox>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, conn_id: ConnectionId, outbox: Outbox) {
        self.outboxes.insert(conn_id, outbox);
    }

    /// Returns true if the connection was present.
    pub fn unregister(&mut self, conn_id: ConnectionId) -> bool {
        self.outboxes.remove(&conn_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.outboxes.len()
    }

    /// Queues `event` for a single connection.
    pub fn send_to(&self, conn_id: ConnectionId, event: ServerEvent) -> bool {
        match self.outboxes.get(&conn_id) {
            Some(outbox) => offer(conn_id, outbox, Arc::new(event)),
            None => false,
        }
    }

    /// Queues `event` for every connection in `audience`.
    pub fn broadcast(&self, event: ServerEvent, audience: Audience) -> Delivery {
        // Shared once; each outbox only holds a pointer.
        let event = Arc::new(event);
        let mut delivery = Delivery::default();

        let recipients = self
            .outboxes
            .iter()
            .filter(|(conn_id, _)| audience.includes(**conn_id));
        for (conn_id, outbox) in recipients {
            if offer(*conn_id, outbox, event.clone()) {
                delivery.delivered += 1;
            } else {
                delivery.dropped += 1;
            }
        }

        delivery
    }
}

fn offer(conn_id: ConnectionId, outbox: &Outbox, event: Arc<ServerEvent>) -> bool {
    match outbox.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!(conn_id, "outbox full; dropping event");
            false
        }
        Err(TrySendError::Closed(_)) => {
            // Socket task already gone; its Leave is on the way.
            debug!(conn_id, "outbox closed; dropping event");
            false
        }
    }
}
