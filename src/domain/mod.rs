// Domain layer: arena entities, tuning and rules.

pub mod errors;
pub mod state;
pub mod systems;
pub mod tuning;

pub use errors::CommandError;
pub use state::{ConnectionId, Nickname, Obstacle, Player, PlayerMove, Position};
