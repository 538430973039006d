#![allow(dead_code)]

use parleyserver::routes;
use parleyserver::state::AppState;
use tokio::net::TcpListener;

/// Test server owning a full AppState. Each instance is isolated — safe for
/// parallel tests.
pub struct TestServer {
    pub state: AppState,
}

impl TestServer {
    pub fn new() -> Self {
        Self {
            state: AppState::new(),
        }
    }

    /// Returns an Axum Router wired to this server's state for `oneshot()`
    /// calls. Routers share the state, so HTTP observations see whatever the
    /// spawned server's sockets did.
    pub fn router(&self) -> axum::Router {
        routes::router(self.state.clone())
    }

    /// Bind an OS-assigned port, serve in the background, return the base
    /// address (`127.0.0.1:port`).
    pub async fn spawn(&self) -> String {
        let app = self.router();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("127.0.0.1:{}", addr.port())
    }
}

pub async fn test_app() -> axum::Router {
    TestServer::new().router()
}
