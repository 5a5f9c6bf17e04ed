// Wire protocol DTOs and conversions for public relay messages.
// Every frame is `{"type": <event name>, "data": <payload>}`.

use crate::domain::{CommandError, ConnectionId, Nickname, Obstacle, Player, PlayerMove};
use crate::use_cases::{GameEvent, ServerEvent, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    // Full registry and arena layout for a freshly connected client.
    Init(InitDto),
    // A player picked a nickname and should be shown to others.
    NewPlayer(PlayerEntryDto),
    // A player's record changed (movement or damage).
    UpdatePlayer(PlayerEntryDto),
    // Bare id of a player that left or was eliminated.
    RemovePlayer(String),
    // Somebody pulled the trigger.
    PlayerFired(PlayerFiredDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    SetNickname(SetNicknamePayload),
    Move(MovePayload),
    Shoot(ShootPayload),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetNicknamePayload {
    pub nickname: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovePayload {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(rename = "rotY")]
    pub rot_y: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShootPayload {
    #[serde(default, rename = "hitPlayerId")]
    pub hit_player_id: Option<String>,
}

impl ClientMessage {
    /// Validates the payload and turns it into a relay command for `conn_id`.
    pub fn into_game_event(self, conn_id: ConnectionId) -> Result<GameEvent, CommandError> {
        match self {
            ClientMessage::SetNickname(payload) => Ok(GameEvent::SetNickname {
                conn_id,
                nickname: Nickname::parse(&payload.nickname)?,
            }),
            ClientMessage::Move(payload) => Ok(GameEvent::Move {
                conn_id,
                update: PlayerMove::new(payload.x, payload.y, payload.z, payload.rot_y)?,
            }),
            ClientMessage::Shoot(payload) => Ok(GameEvent::Shoot {
                conn_id,
                // An id we never issued cannot be registered; treat it as a miss.
                hit_player_id: payload.hit_player_id.as_deref().and_then(parse_conn_id),
            }),
        }
    }
}

pub fn format_conn_id(id: ConnectionId) -> String {
    id.to_string()
}

pub fn parse_conn_id(raw: &str) -> Option<ConnectionId> {
    raw.trim().parse().ok()
}

/// Player record as clients see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerDto {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(rename = "rotY")]
    pub rot_y: f32,
    pub health: i32,
    pub nickname: String,
    pub color: u32,
}

impl From<&Player> for PlayerDto {
    fn from(player: &Player) -> Self {
        Self {
            x: player.position.x,
            y: player.position.y,
            z: player.position.z,
            rot_y: player.rot_y,
            health: player.health,
            nickname: player.nickname.clone(),
            color: player.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObstacleDto {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl From<&Obstacle> for ObstacleDto {
    fn from(obstacle: &Obstacle) -> Self {
        Self {
            x: obstacle.center.x,
            y: obstacle.center.y,
            z: obstacle.center.z,
            width: obstacle.width,
            height: obstacle.height,
            depth: obstacle.depth,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InitDto {
    pub id: String,
    // Ordered so repeated snapshots serialize identically.
    pub players: BTreeMap<String, PlayerDto>,
    pub obstacles: Vec<ObstacleDto>,
}

impl InitDto {
    fn new(id: ConnectionId, snapshot: &Snapshot) -> Self {
        Self {
            id: format_conn_id(id),
            players: snapshot
                .players
                .iter()
                .map(|(id, player)| (format_conn_id(*id), PlayerDto::from(player)))
                .collect(),
            obstacles: snapshot.obstacles.iter().map(ObstacleDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerEntryDto {
    pub id: String,
    pub data: PlayerDto,
}

impl PlayerEntryDto {
    fn new(id: ConnectionId, player: &Player) -> Self {
        Self {
            id: format_conn_id(id),
            data: PlayerDto::from(player),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerFiredDto {
    #[serde(rename = "shooterId")]
    pub shooter_id: String,
}

impl From<&ServerEvent> for ServerMessage {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::Init { id, snapshot } => ServerMessage::Init(InitDto::new(*id, snapshot)),
            ServerEvent::NewPlayer { id, player } => {
                ServerMessage::NewPlayer(PlayerEntryDto::new(*id, player))
            }
            ServerEvent::UpdatePlayer { id, player } => {
                ServerMessage::UpdatePlayer(PlayerEntryDto::new(*id, player))
            }
            ServerEvent::RemovePlayer { id } => ServerMessage::RemovePlayer(format_conn_id(*id)),
            ServerEvent::PlayerFired { shooter_id } => ServerMessage::PlayerFired(PlayerFiredDto {
                shooter_id: format_conn_id(*shooter_id),
            }),
        }
    }
}
