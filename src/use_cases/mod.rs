// Use cases layer: the relay and its connection bookkeeping.

pub mod connections;
pub mod game;
pub mod relay;
pub mod types;

pub use connections::{ConnectionTable, Delivery};
pub use relay::Relay;
pub use types::{Audience, GameEvent, Outbox, ServerEvent, Snapshot};
