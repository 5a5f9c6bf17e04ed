use crate::domain::Position;
use crate::domain::tuning::arena::ArenaTuning;
use rand::Rng;

/// Uniformly random spawn point on the horizontal plane at spawn height.
pub fn spawn_position<R: Rng>(rng: &mut R, arena: &ArenaTuning) -> Position {
    let bound = arena.spawn_bound().abs();
    Position {
        x: rng.random_range(-bound..=bound),
        y: arena.spawn_height,
        z: rng.random_range(-bound..=bound),
    }
}
