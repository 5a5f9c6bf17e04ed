// Shape of the shared arena.

use crate::domain::{Obstacle, Position};

#[derive(Debug, Clone)]
pub struct ArenaTuning {
    /// Half the edge length of the square map, in world units.
    pub map_half_size: f32,

    /// Height players are placed at on spawn.
    pub spawn_height: f32,

    /// Static boxes shipped to every client on connect.
    pub obstacles: Vec<Obstacle>,
}

impl ArenaTuning {
    /// Default arena with a custom map size.
    pub fn with_half_size(map_half_size: f32) -> Self {
        Self {
            map_half_size,
            ..Self::default()
        }
    }

    /// Spawn coordinates are drawn from `[-bound, bound]` on x and z.
    pub fn spawn_bound(&self) -> f32 {
        self.map_half_size / 2.0
    }
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            map_half_size: 45.0,
            spawn_height: 1.8,
            obstacles: vec![
                Obstacle {
                    center: Position {
                        x: 10.0,
                        y: 2.5,
                        z: 10.0,
                    },
                    width: 5.0,
                    height: 5.0,
                    depth: 5.0,
                },
                Obstacle {
                    center: Position {
                        x: -15.0,
                        y: 1.5,
                        z: -15.0,
                    },
                    width: 4.0,
                    height: 3.0,
                    depth: 4.0,
                },
            ],
        }
    }
}
