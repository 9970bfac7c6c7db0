//! Room configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::RoomError;
use crate::game::GameSettings;

/// How long a chat may stay silent before its room shuts down.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Capacity of each room's inbox.
pub const ROOM_INBOX_CAPACITY: usize = 100;

/// Room configuration
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoomConfig {
    /// Username of the bot, stripped from `/command@bot` suffixes.
    pub bot_name: Option<String>,

    /// Silence after which a room destroys its game and stops.
    pub idle_timeout: Duration,

    /// Settings handed to every game started in the room.
    pub game: GameSettings,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            bot_name: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            game: GameSettings::default(),
        }
    }
}

impl RoomConfig {
    /// Validate room configuration
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.idle_timeout.is_zero() {
            return Err(RoomError::ZeroIdleTimeout);
        }
        if self
            .bot_name
            .as_deref()
            .is_some_and(|name| name.trim_start_matches('@').trim().is_empty())
        {
            return Err(RoomError::EmptyBotName);
        }
        self.game.validate()?;
        Ok(())
    }
}
