use axum::{extract::State, Json};
use serde::Serialize;

use crate::{error::Result, models::ApiResponse};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub account: String,
    pub connected: bool,
}

#[derive(Debug, Serialize)]
pub struct DisconnectResponse {
    pub connected: bool,
}

/// POST /api/v1/wallet/connect
pub async fn connect_wallet(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ConnectResponse>>> {
    let account = state.connect().await?;
    Ok(Json(ApiResponse::success(ConnectResponse {
        account,
        connected: true,
    })))
}

/// POST /api/v1/wallet/disconnect
pub async fn disconnect_wallet(
    State(state): State<AppState>,
) -> Json<ApiResponse<DisconnectResponse>> {
    state.disconnect();
    Json(ApiResponse::success(DisconnectResponse { connected: false }))
}
