// Session registry and broadcaster: the authoritative player table.

use super::connections::{ConnectionTable, Delivery};
use super::types::{Audience, GameEvent, Outbox, ServerEvent, Snapshot};
use crate::domain::systems::combat::{HitOutcome, apply_hit};
use crate::domain::systems::spawn::spawn_position;
use crate::domain::tuning::arena::ArenaTuning;
use crate::domain::tuning::player::PlayerTuning;
use crate::domain::{ConnectionId, Nickname, Obstacle, Player, PlayerMove};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Owns every player record and the connections that observe them.
///
/// All mutation goes through `&mut self`, so each operation (lookup, update and
/// fan-out) completes before the next one starts.
pub struct Relay {
    players: HashMap<ConnectionId, Player>,
    connections: ConnectionTable,
    obstacles: Arc<[Obstacle]>,
    arena: ArenaTuning,
    tuning: PlayerTuning,
    rng: StdRng,
    next_conn_id: ConnectionId,
}

impl Relay {
    pub fn new(arena: ArenaTuning, tuning: PlayerTuning) -> Self {
        Self::with_rng(arena, tuning, StdRng::from_os_rng())
    }

    /// Same as `new` with a caller-provided RNG (deterministic spawns in tests).
    pub fn with_rng(arena: ArenaTuning, tuning: PlayerTuning, rng: StdRng) -> Self {
        Self {
            players: HashMap::new(),
            connections: ConnectionTable::new(),
            obstacles: Arc::from(arena.obstacles.clone()),
            arena,
            tuning,
            rng,
            next_conn_id: 1,
        }
    }

    pub fn player(&self, conn_id: ConnectionId) -> Option<&Player> {
        self.players.get(&conn_id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            players: self.players.clone(),
            obstacles: self.obstacles.clone(),
        }
    }

    /// Dispatches one command from the input channel.
    pub fn handle(&mut self, event: GameEvent) {
        match event {
            GameEvent::Join { outbox, reply } => {
                let (conn_id, _) = self.connect(outbox);
                if reply.send(conn_id).is_err() {
                    // Socket task gave up before learning its id.
                    self.disconnect(conn_id);
                }
            }
            GameEvent::SetNickname { conn_id, nickname } => self.set_nickname(conn_id, nickname),
            GameEvent::Move { conn_id, update } => self.move_player(conn_id, update),
            GameEvent::Shoot {
                conn_id,
                hit_player_id,
            } => self.shoot(conn_id, hit_player_id),
            GameEvent::Leave { conn_id } => self.disconnect(conn_id),
        }
    }

    /// Registers a new connection, spawns its player and queues `init` for it.
    pub fn connect(&mut self, outbox: Outbox) -> (ConnectionId, Snapshot) {
        let conn_id = self.next_conn_id;
        self.next_conn_id += 1;

        let player = Player {
            position: spawn_position(&mut self.rng, &self.arena),
            rot_y: 0.0,
            health: self.tuning.max_health,
            nickname: String::new(),
            color: self.tuning.default_color,
        };
        info!(
            conn_id,
            x = player.position.x,
            z = player.position.z,
            "player joined"
        );
        self.players.insert(conn_id, player);
        self.connections.register(conn_id, outbox);

        let snapshot = self.snapshot();
        self.connections.send_to(
            conn_id,
            ServerEvent::Init {
                id: conn_id,
                snapshot: snapshot.clone(),
            },
        );

        (conn_id, snapshot)
    }

    pub fn set_nickname(&mut self, conn_id: ConnectionId, nickname: Nickname) {
        let Some(player) = self.players.get_mut(&conn_id) else {
            debug!(conn_id, "nickname for unknown player ignored");
            return;
        };

        player.nickname = nickname.into_inner();
        info!(conn_id, nickname = %player.nickname, "nickname set");

        let event = ServerEvent::NewPlayer {
            id: conn_id,
            player: player.clone(),
        };
        self.fan_out(event, Audience::AllExcept(conn_id));
    }

    pub fn move_player(&mut self, conn_id: ConnectionId, update: PlayerMove) {
        let Some(player) = self.players.get_mut(&conn_id) else {
            return;
        };

        player.position = update.position;
        player.rot_y = update.rot_y;

        let event = ServerEvent::UpdatePlayer {
            id: conn_id,
            player: player.clone(),
        };
        self.fan_out(event, Audience::AllExcept(conn_id));
    }

    /// Applies a reported hit and announces the shot.
    ///
    /// Damage is skipped when the shooter or target is unknown; `player-fired`
    /// goes out regardless.
    pub fn shoot(&mut self, shooter_id: ConnectionId, hit_player_id: Option<ConnectionId>) {
        let target = hit_player_id.filter(|_| self.players.contains_key(&shooter_id));

        if let Some(target_id) = target {
            if let Some(victim) = self.players.get_mut(&target_id) {
                match apply_hit(victim, self.tuning.hit_damage) {
                    HitOutcome::Eliminated => {
                        self.players.remove(&target_id);
                        info!(shooter_id, target_id, "player eliminated");
                        self.fan_out(ServerEvent::RemovePlayer { id: target_id }, Audience::All);
                    }
                    HitOutcome::Damaged { health } => {
                        debug!(shooter_id, target_id, health, "player hit");
                        let event = ServerEvent::UpdatePlayer {
                            id: target_id,
                            player: victim.clone(),
                        };
                        self.fan_out(event, Audience::All);
                    }
                }
            }
        }

        self.fan_out(ServerEvent::PlayerFired { shooter_id }, Audience::All);
    }

    pub fn disconnect(&mut self, conn_id: ConnectionId) {
        self.connections.unregister(conn_id);

        if self.players.remove(&conn_id).is_some() {
            info!(conn_id, "player left");
            self.fan_out(ServerEvent::RemovePlayer { id: conn_id }, Audience::All);
        }
    }

    fn fan_out(&self, event: ServerEvent, audience: Audience) -> Delivery {
        let delivery = self.connections.broadcast(event, audience);
        if delivery.dropped > 0 {
            debug!(
                delivered = delivery.delivered,
                dropped = delivery.dropped,
                "event not queued for every recipient"
            );
        }
        delivery
    }
}
