/// Gameplay tuning for player records.
///
/// Keep this separate from runtime/server configuration (ports, buffer sizes, etc.).

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Health a player spawns with; also the upper bound.
    pub max_health: i32,

    /// Health removed per confirmed hit.
    pub hit_damage: i32,

    /// Color assigned to every new player (0xRRGGBB).
    pub default_color: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 100,
            hit_damage: 20,
            default_color: 0x00ff00,
        }
    }
}
