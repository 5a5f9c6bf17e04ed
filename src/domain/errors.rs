// Domain-level errors for client commands that fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    NonFiniteCoordinate,
    NicknameTooLong,
    InvalidNicknameCharacter,
}
