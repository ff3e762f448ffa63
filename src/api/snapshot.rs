use axum::{extract::State, Json};
use serde::Serialize;
use crate::models::{ApiResponse, Snapshot};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub connected: bool,
    pub account: Option<String>,
    pub snapshot: Snapshot,
}

/// GET /api/v1/snapshot
pub async fn get_snapshot(State(state): State<AppState>) -> Json<ApiResponse<SnapshotResponse>> {
    let snapshot = state.snapshot();
    Json(ApiResponse::success(SnapshotResponse {
        connected: state.connected(),
        account: snapshot.account.clone(),
        snapshot: Snapshot::clone(&snapshot),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::state_with_wallet;
    use crate::models::SnapshotStatus;

    #[tokio::test]
    async fn snapshot_is_unavailable_before_connect() {
        let Json(response) = get_snapshot(State(state_with_wallet(None))).await;
        assert!(response.success);
        assert!(!response.data.connected);
        assert!(response.data.account.is_none());
        assert_eq!(response.data.snapshot.status, SnapshotStatus::Unavailable);
    }
}
