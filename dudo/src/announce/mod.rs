//! Outbound chat text.
//!
//! The engine never talks to the transport directly. It buffers lines in an
//! [`Announcer`], which flushes them to a [`MessageSink`] once the current
//! event has been fully processed.

pub mod announcer;
pub mod insults;

pub use announcer::{Announcer, Mood};
pub use insults::Insulter;

use serde::Serialize;
use tokio::sync::mpsc;

/// A message ready to be sent to the chat.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Outbound {
    /// Plain text, possibly several announcements joined by newlines.
    Text(String),
    /// The question prompt, to be shown with "Yes"/"No" buttons.
    Poll { prompt: String },
}

impl Outbound {
    /// The text carried by the message, whatever its kind.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Poll { prompt } => prompt,
        }
    }
}

/// Where flushed messages go.
pub trait MessageSink: Send {
    fn deliver(&mut self, message: Outbound);
}

impl MessageSink for mpsc::UnboundedSender<Outbound> {
    fn deliver(&mut self, message: Outbound) {
        if self.send(message).is_err() {
            log::warn!("Outbound channel closed, dropping message");
        }
    }
}
