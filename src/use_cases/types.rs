// Use-case level inputs/outputs for the relay loop.

use crate::domain::{ConnectionId, Nickname, Obstacle, Player, PlayerMove};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Per-connection queue the relay pushes outgoing events into.
pub type Outbox = mpsc::Sender<Arc<ServerEvent>>;

/// Commands flowing from connections into the relay task.
#[derive(Debug)]
pub enum GameEvent {
    Join {
        outbox: Outbox,
        reply: oneshot::Sender<ConnectionId>,
    },
    SetNickname {
        conn_id: ConnectionId,
        nickname: Nickname,
    },
    Move {
        conn_id: ConnectionId,
        update: PlayerMove,
    },
    Shoot {
        conn_id: ConnectionId,
        hit_player_id: Option<ConnectionId>,
    },
    Leave {
        conn_id: ConnectionId,
    },
}

/// Full registry contents handed to a freshly connected client.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub players: HashMap<ConnectionId, Player>,
    pub obstacles: Arc<[Obstacle]>,
}

/// Events the relay fans out to connections.
#[derive(Debug, Clone)]
pub enum ServerEvent {
    Init {
        id: ConnectionId,
        snapshot: Snapshot,
    },
    NewPlayer {
        id: ConnectionId,
        player: Player,
    },
    UpdatePlayer {
        id: ConnectionId,
        player: Player,
    },
    RemovePlayer {
        id: ConnectionId,
    },
    PlayerFired {
        shooter_id: ConnectionId,
    },
}

/// Recipients of a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    All,
    AllExcept(ConnectionId),
}

impl Audience {
    pub fn includes(self, conn_id: ConnectionId) -> bool {
        match self {
            Audience::All => true,
            Audience::AllExcept(excluded) => conn_id != excluded,
        }
    }
}
