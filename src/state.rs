use std::sync::Arc;
use std::time::Instant;

use crate::gateway::broadcast::Broadcaster;
use crate::gateway::presence::PresenceTracker;
use crate::gateway::registry::ConnectionRegistry;

/// One registry per process; the broadcaster and presence tracker share it.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
    pub broadcaster: Arc<Broadcaster>,
    pub presence: Arc<PresenceTracker>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new() -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&registry)));
        let presence = Arc::new(PresenceTracker::new(
            Arc::clone(&registry),
            Arc::clone(&broadcaster),
        ));
        Self {
            registry,
            broadcaster,
            presence,
            started_at: Instant::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
