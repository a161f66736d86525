//! Room Registry
//!
//! Tracks which sessions are connected to which room. Rooms only exist
//! while they have at least one session.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::session::Session;

/// Room name → connected sessions.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, HashMap<Uuid, Arc<Session>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session to its room, creating the room if needed.
    ///
    /// Returns `false` when the session was already registered.
    pub fn register(&self, session: Arc<Session>) -> bool {
        let room = session.room().to_string();
        let session_id = session.id();
        let mut sessions = self.rooms.entry(room.clone()).or_default();

        if sessions.contains_key(&session_id) {
            tracing::warn!(room = %room, session_id = %session_id, "Session already registered");
            return false;
        }
        sessions.insert(session_id, session);

        tracing::info!(
            room = %room,
            session_id = %session_id,
            room_size = sessions.len(),
            "Session registered"
        );
        true
    }

    /// Remove a session. The room goes away with its last session.
    ///
    /// Returns whether anything was removed.
    pub fn unregister(&self, room: &str, session_id: Uuid) -> bool {
        // Room removal happens under the same shard lock as the session
        // removal, so a concurrent register cannot land in a dropped map.
        let Entry::Occupied(mut entry) = self.rooms.entry(room.to_string()) else {
            return false;
        };

        let removed = entry.get_mut().remove(&session_id).is_some();
        if entry.get().is_empty() {
            entry.remove();
            tracing::debug!(room = %room, "Room emptied");
        }

        if removed {
            tracing::info!(room = %room, session_id = %session_id, "Session unregistered");
        }
        removed
    }

    /// Snapshot of a room's sessions, safe to iterate while others join or leave.
    pub fn sessions_in(&self, room: &str) -> Vec<Arc<Session>> {
        self.rooms
            .get(room)
            .map(|sessions| sessions.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn session_count(&self) -> usize {
        self.rooms.iter().map(|room| room.value().len()).sum()
    }
}
