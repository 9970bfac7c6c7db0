//! Room module connecting chats to games with an async actor model.
//!
//! This module implements:
//! - RoomActor: Async actor serving a single chat and its current game
//! - RoomManager: Routes chat events to rooms, spawning them on demand
//! - Command parsing for the chat commands players type
//!
//! ## Architecture
//!
//! Each room runs in a separate Tokio task with an mpsc message inbox. A room
//! that hears nothing for its idle timeout destroys its game and stops; the
//! manager spawns a fresh one when the chat speaks again. Every outbound
//! message, tagged with its chat id, goes to a single channel owned by the
//! transport.
//!
//! ## Example
//!
//! ```no_run
//! use dudo::room::{ChatEvent, RoomConfig, RoomManager};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (outbox, mut messages) = mpsc::unbounded_channel();
//!     let manager = RoomManager::new(RoomConfig::default(), outbox);
//!
//!     let event = ChatEvent::Message {
//!         user_id: 1,
//!         name: "alice".to_string(),
//!         text: "/startgame".to_string(),
//!     };
//!     manager.dispatch(42, event).await.unwrap();
//!
//!     while let Some(output) = messages.recv().await {
//!         println!("[{}] {}", output.chat_id, output.message.text());
//!     }
//! }
//! ```

pub mod actor;
pub mod commands;
pub mod config;
pub mod errors;
pub mod manager;
pub mod messages;

pub use actor::{RoomActor, RoomHandle};
pub use commands::{Command, HELP, ParseError, parse_answer, parse_bet, parse_command, parse_question};
pub use config::{DEFAULT_IDLE_TIMEOUT, RoomConfig};
pub use errors::{RoomError, RoomResult};
pub use manager::RoomManager;
pub use messages::{ChatEvent, ChatId, RoomMessage, RoomOutput, RoomStateResponse};
