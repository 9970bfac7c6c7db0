//! Room manager for spawning and routing to per-chat room actors.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::{RwLock, mpsc};

use super::{
    actor::{RoomActor, RoomHandle},
    config::RoomConfig,
    errors::{RoomError, RoomResult},
    messages::{ChatEvent, ChatId, RoomOutput, RoomStateResponse},
};

/// Room manager for managing one room per chat
pub struct RoomManager {
    config: RoomConfig,

    /// Active room handles
    rooms: Arc<RwLock<HashMap<ChatId, RoomHandle>>>,

    /// Shared by every room
    outbox: mpsc::UnboundedSender<RoomOutput>,
}

impl RoomManager {
    /// Create a new room manager. Everything the rooms say ends up in
    /// `outbox`.
    pub fn new(config: RoomConfig, outbox: mpsc::UnboundedSender<RoomOutput>) -> Self {
        Self {
            config,
            rooms: Arc::new(RwLock::new(HashMap::new())),
            outbox,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Routes `event` to the chat's room, spawning one if the chat has
    /// none or its previous room has stopped.
    pub async fn dispatch(&self, chat_id: ChatId, event: ChatEvent) -> RoomResult<()> {
        let handle = self.get_or_spawn(chat_id).await;
        match handle.dispatch(event.clone()).await {
            Err(RoomError::Closed(_)) => {
                // Raced with the room going idle.
                self.remove_if_closed(chat_id).await;
                self.get_or_spawn(chat_id).await.dispatch(event).await
            }
            result => result,
        }
    }

    pub async fn get_room(&self, chat_id: ChatId) -> Option<RoomHandle> {
        let rooms = self.rooms.read().await;
        rooms
            .get(&chat_id)
            .filter(|handle| !handle.is_closed())
            .cloned()
    }

    pub async fn room_state(&self, chat_id: ChatId) -> RoomResult<RoomStateResponse> {
        match self.get_room(chat_id).await {
            Some(handle) => handle.state().await,
            None => Err(RoomError::Closed(chat_id)),
        }
    }

    /// Stops the chat's room, destroying any game in it.
    pub async fn close_room(&self, chat_id: ChatId) -> RoomResult<()> {
        let handle = self.rooms.write().await.remove(&chat_id);
        match handle {
            Some(handle) => handle.close().await,
            None => Err(RoomError::Closed(chat_id)),
        }
    }

    /// Stops every room.
    pub async fn close_all(&self) {
        let handles: Vec<RoomHandle> = self.rooms.write().await.drain().map(|(_, h)| h).collect();
        for handle in handles {
            if let Err(e) = handle.close().await {
                log::debug!("{e}");
            }
        }
    }

    /// Number of rooms whose actor is still running. Stopped rooms are
    /// forgotten along the way.
    pub async fn active_room_count(&self) -> usize {
        let mut rooms = self.rooms.write().await;
        rooms.retain(|_, handle| !handle.is_closed());
        rooms.len()
    }

    async fn get_or_spawn(&self, chat_id: ChatId) -> RoomHandle {
        if let Some(handle) = self.get_room(chat_id).await {
            return handle;
        }

        let mut rooms = self.rooms.write().await;
        // Somebody else may have spawned it while we waited for the lock.
        if let Some(handle) = rooms.get(&chat_id).filter(|handle| !handle.is_closed()) {
            return handle.clone();
        }

        let (actor, handle) = RoomActor::new(chat_id, self.config.clone(), self.outbox.clone());
        rooms.insert(chat_id, handle.clone());
        drop(rooms);

        tokio::spawn(async move {
            actor.run().await;
        });

        log::info!("Spawned room for chat {chat_id}");
        handle
    }

    async fn remove_if_closed(&self, chat_id: ChatId) {
        let mut rooms = self.rooms.write().await;
        if rooms.get(&chat_id).is_some_and(RoomHandle::is_closed) {
            rooms.remove(&chat_id);
        }
    }
}
