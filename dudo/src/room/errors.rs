//! Error types for the room module

use thiserror::Error;

use super::messages::ChatId;
use crate::game::SettingsError;

/// Result type for room operations
pub type RoomResult<T> = Result<T, RoomError>;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room {0} is closed")]
    Closed(ChatId),

    #[error("Room {0} dropped the request")]
    NoResponse(ChatId),

    #[error("Idle timeout must be longer than zero")]
    ZeroIdleTimeout,

    #[error("Bot name must not be empty")]
    EmptyBotName,

    #[error("Invalid game settings: {0}")]
    Settings(#[from] SettingsError),
}
