use crate::domain::Player;

/// Result of applying one hit to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Player survives with the given health.
    Damaged { health: i32 },
    /// Health reached zero; the record must be removed.
    Eliminated,
}

/// Subtracts `damage` from the player's health, flooring at zero.
pub fn apply_hit(player: &mut Player, damage: i32) -> HitOutcome {
    player.health = (player.health - damage).max(0);
    if player.health == 0 {
        HitOutcome::Eliminated
    } else {
        HitOutcome::Damaged {
            health: player.health,
        }
    }
}
