use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;

use crate::{api::AppState, models::Snapshot};

#[derive(Debug, Serialize)]
struct SnapshotUpdate<'a> {
    #[serde(rename = "type")]
    msg_type: &'static str,
    connected: bool,
    snapshot: &'a Snapshot,
}

fn snapshot_payload(snapshot: &Snapshot, connected: bool) -> String {
    let update = SnapshotUpdate {
        msg_type: "snapshot",
        connected,
        snapshot,
    };
    serde_json::to_string(&update).unwrap_or_default()
}

/// WebSocket handler streaming every published snapshot
pub async fn handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut updates = state.scheduler.subscribe();

    let state_clone = state.clone();
    let mut send_task = tokio::spawn(async move {
        let initial: Arc<Snapshot> = updates.borrow_and_update().clone();
        let payload = snapshot_payload(&initial, state_clone.connected());
        if sender.send(Message::Text(payload.into())).await.is_err() {
            return;
        }

        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            let payload = snapshot_payload(&snapshot, state_clone.connected());
            if sender.send(Message::Text(payload.into())).await.is_err() {
                return;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                tracing::info!("Snapshot stream client disconnected");
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    tracing::info!("Snapshot WebSocket connection closed");
}
