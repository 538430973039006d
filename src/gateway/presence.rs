use std::sync::Arc;

use super::broadcast::Broadcaster;
use super::events::{Event, PresenceStatus};
use super::registry::{ConnectionHandle, ConnectionRegistry};

/// Turns registry transitions into presence events.
///
/// Transitions are the booleans returned by the registry's register and
/// deregister calls, computed inside its critical section; this tracker keeps
/// no counter of its own that could drift.
pub struct PresenceTracker {
    registry: Arc<ConnectionRegistry>,
    broadcaster: Arc<Broadcaster>,
}

impl PresenceTracker {
    pub fn new(registry: Arc<ConnectionRegistry>, broadcaster: Arc<Broadcaster>) -> Self {
        Self {
            registry,
            broadcaster,
        }
    }

    /// Call after registering a new connection. Only the user's first
    /// connection broadcasts the online transition; every connection gets its
    /// own post-registration snapshot, which therefore lists the user itself.
    /// The newly connected user is deliberately among the recipients of its
    /// own online event.
    pub fn connection_admitted(&self, user_id: &str, came_online: bool, conn: &ConnectionHandle) {
        if came_online {
            tracing::info!(%user_id, "user online");
            self.broadcaster
                .broadcast_to_online(&Event::user_status_change(user_id, PresenceStatus::Online));
        }
        let snapshot = Event::initial_status(self.registry.online_user_ids());
        if conn.send(snapshot.to_payload()).is_err() {
            tracing::debug!(%user_id, connection_id = %conn.id(), "connection closed before initial snapshot");
        }
    }

    /// Call after deregistering a connection. Emits exactly one offline
    /// event per online-to-offline transition, to the remaining online users.
    pub fn connection_closed(&self, user_id: &str, went_offline: bool) {
        if went_offline {
            tracing::info!(%user_id, "user offline");
            self.broadcaster
                .broadcast_to_online(&Event::user_status_change(user_id, PresenceStatus::Offline));
        }
    }
}
