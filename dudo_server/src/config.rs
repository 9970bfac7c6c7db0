//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use dudo::{GameSettings, RoomConfig, room::DEFAULT_IDLE_TIMEOUT};
use std::time::Duration;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bot username, stripped from `/command@bot` suffixes
    pub bot_name: Option<String>,
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
}

/// Timeouts, in seconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// First lobby deadline
    pub lobby_secs: u64,
    /// Lobby deadline after each join or flee
    pub join_secs: u64,
    /// Deadline for asking, answering and guessing
    pub turn_secs: u64,
    /// Silence after which a chat's room shuts down
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        let game = GameSettings::default();
        Self {
            lobby_secs: game.lobby_timeout.as_secs(),
            join_secs: game.lobby_rearm_timeout.as_secs(),
            turn_secs: game.turn_timeout.as_secs(),
            idle_secs: DEFAULT_IDLE_TIMEOUT.as_secs(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bot_name_override` - Optional bot name override (from CLI args)
    /// * `idle_secs_override` - Optional idle timeout override (from CLI args)
    pub fn from_env(bot_name_override: Option<String>, idle_secs_override: Option<u64>) -> Self {
        let bot_name = bot_name_override
            .or_else(|| std::env::var("DUDO_BOT_NAME").ok())
            .filter(|name| !name.trim().is_empty());

        let defaults = TimeoutConfig::default();
        let timeouts = TimeoutConfig {
            lobby_secs: parse_env_or("DUDO_LOBBY_TIMEOUT_SECS", defaults.lobby_secs),
            join_secs: parse_env_or("DUDO_JOIN_TIMEOUT_SECS", defaults.join_secs),
            turn_secs: parse_env_or("DUDO_TURN_TIMEOUT_SECS", defaults.turn_secs),
            idle_secs: idle_secs_override
                .unwrap_or_else(|| parse_env_or("DUDO_IDLE_TIMEOUT_SECS", defaults.idle_secs)),
        };

        Self { bot_name, timeouts }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (var, secs) in [
            ("DUDO_LOBBY_TIMEOUT_SECS", self.timeouts.lobby_secs),
            ("DUDO_JOIN_TIMEOUT_SECS", self.timeouts.join_secs),
            ("DUDO_TURN_TIMEOUT_SECS", self.timeouts.turn_secs),
            ("DUDO_IDLE_TIMEOUT_SECS", self.timeouts.idle_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
        }

        if self.timeouts.idle_secs <= self.timeouts.turn_secs {
            return Err(ConfigError::Invalid {
                var: "DUDO_IDLE_TIMEOUT_SECS".to_string(),
                reason: format!(
                    "Must be greater than the turn timeout ({})",
                    self.timeouts.turn_secs
                ),
            });
        }

        self.room_config()
            .validate()
            .map_err(|e| ConfigError::Room(e.to_string()))
    }

    /// The room configuration every chat gets.
    pub fn room_config(&self) -> RoomConfig {
        RoomConfig {
            bot_name: self.bot_name.clone(),
            idle_timeout: Duration::from_secs(self.timeouts.idle_secs),
            game: GameSettings {
                lobby_timeout: Duration::from_secs(self.timeouts.lobby_secs),
                lobby_rearm_timeout: Duration::from_secs(self.timeouts.join_secs),
                turn_timeout: Duration::from_secs(self.timeouts.turn_secs),
                ..GameSettings::default()
            },
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("Invalid room configuration: {0}")]
    Room(String),
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
