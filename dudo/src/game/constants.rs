//! Game-wide constants.

use std::time::Duration;

/// Fewest players a game can continue with once it has left the lobby.
pub const MIN_PLAYERS: usize = 2;

/// Fewest players the lobby tolerates before giving up on a game.
pub const LOBBY_MIN_PLAYERS: usize = 1;

/// How long the lobby waits after opening.
pub const DEFAULT_LOBBY_TIMEOUT: Duration = Duration::from_secs(60);

/// How long the lobby keeps waiting after somebody joins or flees.
pub const DEFAULT_LOBBY_REARM_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a questioner, guesser or voter has to act.
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(50);

/// Display names are truncated to this many characters.
pub const MAX_NAME_LENGTH: usize = 32;

/// Placeholder used when a player's name can't be resolved.
pub const UNKNOWN_PLAYER: &str = "somebody";
