use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// Operator check: who is online right now. The registry gives no ordering,
/// so sort for stable output.
pub async fn online_users(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut online = state.registry.online_user_ids();
    online.sort();
    Json(serde_json::json!({
        "data": {
            "onlineUserIds": online
        }
    }))
}
