//! The real-time WebSocket endpoint: `GET /ws/market`.
//!
//! Authentication happens before the upgrade — a connect without a valid
//! bearer token never becomes a session. After the upgrade the socket
//! speaks JSON frames:
//!
//! ```json
//! {"frame": "subscribe",   "destination": "/topic/market/AAPL"}
//! {"frame": "unsubscribe", "destination": "/topic/market/AAPL"}
//! {"frame": "send", "destination": "/app/market/subscribe",
//!  "body": {"action": "subscribe", "symbols": ["AAPL"]}}
//! ```
//!
//! Outbound traffic flows from the hub's per-session queue to the socket;
//! inbound frames go through the rate limiter and the session gateway.
//! Disconnect — clean or not — removes the session from index and hub.

use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use feed::destinations::APP_SUBSCRIBE;
use feed::SubscriptionRequest;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Inbound frames from clients.
#[derive(Debug, Deserialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Subscribe to a topic or queue destination.
    Subscribe { destination: String },
    /// Unsubscribe from a destination.
    Unsubscribe { destination: String },
    /// Application-level send.
    Send {
        destination: String,
        body: serde_json::Value,
    },
}

/// WebSocket upgrade handler: `GET /ws/market`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let user = match state.auth.authenticate(auth_header) {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "rejected WebSocket connection");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, user.user_id))
        .into_response()
}

/// Drive one connected session until either direction closes.
async fn handle_socket(socket: WebSocket, state: AppState, user_id: String) {
    let session_id = Uuid::new_v4().to_string();
    info!(session = %session_id, user = %user_id, "WebSocket connected");

    let mut outbound = state.hub.register(&session_id);
    let (mut sender, mut receiver) = socket.split();

    // Forward hub deliveries to the socket.
    let send_task = tokio::spawn(async move {
        while let Some(payload) = outbound.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break; // client disconnected
            }
        }
    });

    // Process inbound frames.
    let recv_state = state.clone();
    let recv_session = session_id.clone();
    let recv_user = user_id.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(message) = receiver.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    handle_frame(&recv_state, &recv_session, &recv_user, &text);
                }
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    warn!(session = %recv_session, error = %e, "WebSocket error");
                    break;
                }
                _ => {} // ignore ping/pong/binary
            }
        }
    });

    // Either direction closing ends the session.
    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    state.lifecycle.handle_disconnect(&session_id);
    state.rate_limiter.forget(&session_id);
    state.hub.unregister(&session_id);
    info!(session = %session_id, "WebSocket disconnected");
}

/// Dispatch one inbound frame.
fn handle_frame(state: &AppState, session_id: &str, user_id: &str, text: &str) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            debug!(session = session_id, error = %e, "invalid frame from client");
            return;
        }
    };

    match frame {
        ClientFrame::Subscribe { destination } => {
            state.hub.subscribe(session_id, &destination);
            state.lifecycle.handle_topic_subscribe(session_id, &destination);
        }
        ClientFrame::Unsubscribe { destination } => {
            state.hub.unsubscribe(session_id, &destination);
            debug!(session = session_id, %destination, "unsubscribed from destination");
        }
        ClientFrame::Send { destination, body } => {
            if destination != APP_SUBSCRIBE {
                debug!(session = session_id, %destination, "send to unknown destination");
                return;
            }
            if !state.rate_limiter.check(session_id) {
                state.dispatcher.send_error(
                    session_id,
                    "Rate limit exceeded. Slow down subscription requests.",
                );
                return;
            }
            match serde_json::from_value::<SubscriptionRequest>(body) {
                Ok(request) => {
                    state
                        .lifecycle
                        .handle_subscribe_request(session_id, user_id, &request);
                }
                Err(e) => {
                    debug!(session = session_id, error = %e, "malformed subscription request");
                    state
                        .dispatcher
                        .send_error(session_id, "Malformed subscription request");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_frame_parses() {
        let json = r#"{"frame": "subscribe", "destination": "/topic/market/AAPL"}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        assert!(matches!(
            frame,
            ClientFrame::Subscribe { destination } if destination == "/topic/market/AAPL"
        ));
    }

    #[test]
    fn test_send_frame_parses_body() {
        let json = r#"{"frame": "send", "destination": "/app/market/subscribe",
                       "body": {"action": "subscribe", "symbols": ["aapl"]}}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        match frame {
            ClientFrame::Send { destination, body } => {
                assert_eq!(destination, "/app/market/subscribe");
                let request: SubscriptionRequest = serde_json::from_value(body).unwrap();
                assert_eq!(request.symbols, vec!["aapl"]);
            }
            _ => panic!("expected send frame"),
        }
    }

    #[test]
    fn test_unknown_frame_rejected() {
        let json = r#"{"frame": "teleport", "destination": "/nowhere"}"#;
        assert!(serde_json::from_str::<ClientFrame>(json).is_err());
    }
}
