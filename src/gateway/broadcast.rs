use std::sync::Arc;

use super::events::{Event, PresenceStatus};
use super::registry::ConnectionRegistry;

/// Fans one event out to the live connections of a set of target users.
///
/// Delivery is best-effort and at-most-once per connection per call: offline
/// targets are skipped, and a write failure on one connection never aborts
/// the rest. A failed write means the socket task is gone, so the connection
/// is reaped from the registry on the spot.
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver `event` to every live connection of every id in `user_ids`.
    /// Duplicate ids are processed independently. Never fails.
    pub fn broadcast_to_users(&self, user_ids: &[String], event: &Event) {
        let payload = event.to_payload();
        let mut dead = Vec::new();
        for user_id in user_ids {
            self.send_to_user(user_id, &payload, &mut dead);
        }
        self.reap(dead);
    }

    /// Deliver `event` to every currently online user. Used for presence
    /// transitions, which go to the whole online set.
    pub fn broadcast_to_online(&self, event: &Event) {
        let payload = event.to_payload();
        let mut dead = Vec::new();
        for user_id in self.registry.online_user_ids() {
            self.send_to_user(&user_id, &payload, &mut dead);
        }
        self.reap(dead);
    }

    fn send_to_user(&self, user_id: &str, payload: &str, dead: &mut Vec<(String, String)>) {
        for conn in self.registry.connections_for(user_id) {
            if conn.send(payload.to_string()).is_err() {
                dead.push((user_id.to_string(), conn.id().to_string()));
            }
        }
    }

    /// Deregister connections whose socket task is gone. When that was a
    /// user's last connection, the remaining online users are told it went
    /// offline; that fan-out can itself surface more dead connections, so
    /// loop until quiet.
    fn reap(&self, mut dead: Vec<(String, String)>) {
        while !dead.is_empty() {
            let mut next = Vec::new();
            for (user_id, connection_id) in dead.drain(..) {
                tracing::debug!(%user_id, %connection_id, "reaping closed connection");
                if self.registry.deregister(&user_id, &connection_id) {
                    tracing::info!(%user_id, "user offline (connection reaped)");
                    let payload =
                        Event::user_status_change(&user_id, PresenceStatus::Offline).to_payload();
                    for target in self.registry.online_user_ids() {
                        self.send_to_user(&target, &payload, &mut next);
                    }
                }
            }
            dead = next;
        }
    }
}
