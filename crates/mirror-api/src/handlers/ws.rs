//! WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt, future};
use tracing::{debug, error};

use mirror_realtime::message::frame::{InboundFrame, OutboundFrame};

use crate::state::AppState;

/// GET /ws: WebSocket upgrade. Identity arrives in the first message,
/// so the upgrade itself is unconditional.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_ws_connection(state, socket))
}

/// Hands an established WebSocket to the relay engine.
async fn handle_ws_connection(state: AppState, socket: WebSocket) {
    let (ws_tx, ws_rx) = socket.split();

    // Ping/pong are answered by axum and never reach the session.
    let inbound = ws_rx.filter_map(|result| {
        future::ready(match result {
            Ok(Message::Text(text)) => Some(Ok(InboundFrame::Text(text.as_str().to_owned()))),
            Ok(Message::Binary(bytes)) => Some(Ok(InboundFrame::Binary(bytes.to_vec()))),
            Ok(Message::Close(_)) => Some(Ok(InboundFrame::Close)),
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => None,
            Err(e) => Some(Err(e)),
        })
    });

    let outbound = ws_tx.with(|frame: OutboundFrame| {
        future::ready(Ok::<_, axum::Error>(match frame {
            OutboundFrame::Text(text) => Message::Text(text.into()),
            OutboundFrame::Close => Message::Close(None),
        }))
    });

    let session = state.engine.accept(Box::pin(inbound), Box::pin(outbound));

    match session.await {
        Ok(report) => debug!(conn_id = %report.id, "WebSocket connection closed"),
        Err(e) => error!(error = %e, "WebSocket session task failed"),
    }
}
