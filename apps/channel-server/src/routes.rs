use crate::orchestrator::Channel;
use crate::viewers::ViewerRegistry;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct AppState {
	pub channel: Channel,
	pub viewers: Arc<ViewerRegistry>,
}

pub fn router(state: AppState) -> Router {
	Router::new().route("/ws", get(ws_handler)).route("/health", get(health)).with_state(state)
}

async fn health() -> impl IntoResponse {
	Json(json!({ "status": "ok" }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
	ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
	let (mut sender, mut receiver) = socket.split();

	let (viewer_id, mut snapshots) = state.viewers.register();
	info!(viewer = viewer_id, total = state.viewers.len(), "viewer connected");

	if let Err(error) = state.channel.viewer_join(viewer_id) {
		error!(viewer = viewer_id, %error, "could not raise join event");
		state.viewers.deregister(viewer_id);
		return;
	}

	// Forward snapshots from this viewer's queue onto the socket
	let forward_task = tokio::spawn(async move {
		while let Some(snapshot) = snapshots.recv().await {
			let json = match serde_json::to_string(&snapshot) {
				Ok(json) => json,
				Err(error) => {
					error!(%error, "failed to serialize snapshot");
					continue;
				}
			};

			if sender.send(Message::Text(json)).await.is_err() {
				break;
			}
		}
	});

	// Viewers send nothing the channel acts on; drain until close
	while let Some(result) = receiver.next().await {
		match result {
			Ok(Message::Close(reason)) => {
				debug!(viewer = viewer_id, ?reason, "viewer closed connection");
				break;
			}
			Ok(_) => {}
			Err(error) => {
				warn!(viewer = viewer_id, %error, "viewer socket error");
				break;
			}
		}
	}

	state.viewers.deregister(viewer_id);
	forward_task.abort();
	info!(viewer = viewer_id, total = state.viewers.len(), "viewer disconnected");
}
