// Domain-level arena entities and validated player commands.

use super::errors::CommandError;

/// Opaque identifier of one live client connection; also the player key.
pub type ConnectionId = u64;

/// Longest nickname accepted, in characters.
pub const MAX_NICKNAME_CHARS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub position: Position,
    // Horizontal yaw in radians.
    pub rot_y: f32,
    pub health: i32,
    pub nickname: String,
    pub color: u32,
}

/// Static axis-aligned box placed in the arena at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub center: Position,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

/// Position/rotation overwrite reported by a client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerMove {
    pub position: Position,
    pub rot_y: f32,
}

impl PlayerMove {
    /// Builds a move, rejecting NaN and infinite components.
    pub fn new(x: f32, y: f32, z: f32, rot_y: f32) -> Result<Self, CommandError> {
        if ![x, y, z, rot_y].iter().all(|v| v.is_finite()) {
            return Err(CommandError::NonFiniteCoordinate);
        }

        Ok(Self {
            position: Position { x, y, z },
            rot_y,
        })
    }
}

/// Display name that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nickname(String);

impl Nickname {
    pub fn parse(raw: &str) -> Result<Self, CommandError> {
        // Blank is allowed; the player simply stays unnamed.
        let value = raw.trim();
        if value.chars().count() > MAX_NICKNAME_CHARS {
            return Err(CommandError::NicknameTooLong);
        }
        if value.chars().any(char::is_control) {
            return Err(CommandError::InvalidNicknameCharacter);
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
