use dashmap::DashMap;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Handle to one live connection's outbound queue. Cloning is cheap; all
/// clones address the same socket task.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: String,
    tx: mpsc::UnboundedSender<String>,
}

impl ConnectionHandle {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tx,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Queue a payload for the socket task. Non-blocking; the only failure
    /// mode is a receiver that is already gone.
    pub fn send(&self, payload: String) -> Result<(), mpsc::error::SendError<String>> {
        self.tx.send(payload)
    }
}

/// The single source of truth for which users are currently reachable.
///
/// Maps user id to that user's live connections. A key exists iff the user
/// has at least one connection; empty sets are removed inside the same
/// critical section that empties them, so the offline/online transition is
/// decided atomically per key even under concurrent register/deregister.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    users: DashMap<String, HashMap<String, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    /// Add a connection for `user_id`, creating the entry if absent.
    /// Returns true iff this took the user from offline to online.
    /// Re-registering a connection id replaces the handle, never
    /// double-counts.
    pub fn register(&self, user_id: &str, conn: ConnectionHandle) -> bool {
        let mut entry = self.users.entry(user_id.to_string()).or_default();
        let came_online = entry.is_empty();
        entry.insert(conn.id.clone(), conn);
        came_online
    }

    /// Remove one connection. Returns true iff this took the user from
    /// online to offline (its last connection closed). Unknown user or
    /// connection is a no-op, so double teardown is harmless.
    pub fn deregister(&self, user_id: &str, connection_id: &str) -> bool {
        self.users
            .remove_if_mut(user_id, |_, conns| {
                conns.remove(connection_id);
                conns.is_empty()
            })
            .is_some()
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    /// Unordered snapshot of every online user id.
    pub fn online_user_ids(&self) -> Vec<String> {
        self.users.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Snapshot of `user_id`'s live connections; empty if offline.
    pub fn connections_for(&self, user_id: &str) -> Vec<ConnectionHandle> {
        self.users
            .get(user_id)
            .map(|conns| conns.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> (ConnectionHandle, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionHandle::new(tx), rx)
    }

    #[test]
    fn test_online_iff_has_connections() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.is_online("1"));
        assert!(registry.connections_for("1").is_empty());

        let (conn, _rx) = handle();
        let id = conn.id().to_string();
        registry.register("1", conn);
        assert!(registry.is_online("1"));
        assert_eq!(registry.connections_for("1").len(), 1);

        registry.deregister("1", &id);
        assert!(!registry.is_online("1"));
        assert!(registry.connections_for("1").is_empty());
    }

    #[test]
    fn test_first_register_reports_online_transition() {
        let registry = ConnectionRegistry::new();
        let (a, _rx_a) = handle();
        let (b, _rx_b) = handle();
        assert!(registry.register("1", a));
        assert!(!registry.register("1", b), "second device is not a transition");
    }

    #[test]
    fn test_offline_only_after_last_connection() {
        let registry = ConnectionRegistry::new();
        let (a, _rx_a) = handle();
        let (b, _rx_b) = handle();
        let id_a = a.id().to_string();
        let id_b = b.id().to_string();
        registry.register("1", a);
        registry.register("1", b);

        assert!(!registry.deregister("1", &id_a));
        assert!(registry.is_online("1"));
        assert!(registry.deregister("1", &id_b));
        assert!(!registry.is_online("1"));
    }

    #[test]
    fn test_deregister_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = handle();
        let id = conn.id().to_string();
        registry.register("1", conn);

        assert!(registry.deregister("1", &id));
        assert!(!registry.deregister("1", &id));
        assert!(!registry.deregister("1", &id));
        assert!(!registry.deregister("nobody", "whatever"));
    }

    #[test]
    fn test_reregistering_same_connection_does_not_double_count() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = handle();
        let id = conn.id().to_string();
        registry.register("1", conn.clone());
        registry.register("1", conn);
        assert_eq!(registry.connections_for("1").len(), 1);

        assert!(registry.deregister("1", &id), "one removal must empty the set");
    }

    #[test]
    fn test_online_user_ids_snapshot() {
        let registry = ConnectionRegistry::new();
        let (a, _rx_a) = handle();
        let (b, _rx_b) = handle();
        registry.register("1", a);
        registry.register("2", b);
        let mut online = registry.online_user_ids();
        online.sort();
        assert_eq!(online, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_concurrent_deregister_yields_one_offline_transition() {
        let registry = std::sync::Arc::new(ConnectionRegistry::new());
        for _ in 0..50 {
            let (a, _rx_a) = handle();
            let (b, _rx_b) = handle();
            let id_a = a.id().to_string();
            let id_b = b.id().to_string();
            registry.register("1", a);
            registry.register("1", b);

            let transitions: usize = std::thread::scope(|scope| {
                let r1 = std::sync::Arc::clone(&registry);
                let r2 = std::sync::Arc::clone(&registry);
                let t1 = scope.spawn(move || r1.deregister("1", &id_a) as usize);
                let t2 = scope.spawn(move || r2.deregister("1", &id_b) as usize);
                t1.join().unwrap() + t2.join().unwrap()
            });
            assert_eq!(transitions, 1, "both closes must remove, exactly one transitions");
            assert!(!registry.is_online("1"));
        }
    }
}
