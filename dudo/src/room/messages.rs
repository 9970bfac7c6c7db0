//! Room actor message types.

use serde::Serialize;
use tokio::sync::oneshot;

use crate::announce::Outbound;
use crate::game::entities::{Bet, PlayerId};

/// Identifies a chat, and with it the room serving it.
pub type ChatId = i64;

/// Something a chat member did.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChatEvent {
    /// A text message, possibly a command.
    Message {
        user_id: PlayerId,
        name: String,
        text: String,
    },

    /// A poll button press carrying the button's payload.
    PollAnswer { user_id: PlayerId, data: String },
}

/// Messages that can be sent to a RoomActor
#[derive(Debug)]
pub enum RoomMessage {
    Event(ChatEvent),

    /// Get current room state
    GetState {
        response: oneshot::Sender<RoomStateResponse>,
    },

    /// Destroy any running game and stop the room
    Close { response: oneshot::Sender<()> },
}

/// Room state snapshot
#[derive(Clone, Debug, Default, Serialize)]
pub struct RoomStateResponse {
    pub chat_id: ChatId,
    pub has_game: bool,
    pub phase: Option<String>,
    pub players: Vec<String>,
    pub owner: Option<String>,
    pub question: Option<String>,
    pub current_bet: Bet,
    pub rounds_played: u32,
}

/// A message on its way out to a chat.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RoomOutput {
    pub chat_id: ChatId,
    pub message: Outbound,
}
