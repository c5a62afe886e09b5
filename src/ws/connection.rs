//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching client events to its [`Session`] and forwarding relayed
//! messages from the connection's outbound queue.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::messages::{ClientEvent, ServerEvent};
use super::session::Session;
use crate::domain::{Delivery, UserId};
use crate::error::RelayError;
use crate::service::RelayService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads client events and applies them to the connection's session.
/// - Writes deliveries queued for this connection by other senders.
///
/// When the socket closes, errors, or a write fails, the session is
/// disconnected exactly once before returning.
pub async fn run_connection(
    socket: WebSocket,
    relay: Arc<RelayService>,
    queue_capacity: usize,
    initial_user: Option<UserId>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut deliveries) = mpsc::channel::<Delivery>(queue_capacity.max(1));
    let mut session = Session::new(relay, tx);
    tracing::debug!(connection_id = %session.id(), "ws connection accepted");

    if let Some(user_id) = initial_user {
        let reply = reply_for(session.register(user_id.as_str()).await.map(Some));
        if let Some(json) = reply
            && ws_tx.send(Message::text(json)).await.is_err()
        {
            session.disconnect().await;
            return;
        }
    }

    loop {
        tokio::select! {
            // Incoming frame from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut session).await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(connection_id = %session.id(), error = %e, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            // Message relayed to this connection
            delivery = deliveries.recv() => {
                let Some(delivery) = delivery else { break };
                if let Some(json) = ServerEvent::from(delivery).to_json()
                    && ws_tx.send(Message::text(json)).await.is_err()
                {
                    break;
                }
            }
        }
    }

    session.disconnect().await;
    tracing::debug!(connection_id = %session.id(), "ws connection closed");
}

/// Applies one text frame to the session, returning an optional reply.
///
/// Relayed sends produce no reply: the sender is never told whether the
/// recipient was reached.
async fn handle_text_message(text: &str, session: &mut Session) -> Option<String> {
    let event = match ClientEvent::parse(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(connection_id = %session.id(), error = %e, "bad client frame");
            return ServerEvent::from(&e).to_json();
        }
    };

    match event {
        ClientEvent::Register { user_id } => reply_for(session.register(&user_id).await.map(Some)),
        ClientEvent::PrivateMessage { to, message, from } => {
            if let (Some(claimed), Some(actual)) = (from.as_deref(), session.user_id())
                && claimed != actual.as_str()
            {
                tracing::debug!(%actual, claimed, "ignoring client-supplied sender");
            }
            reply_for(session.send(&to, message).await.map(|_| None))
        }
    }
}

/// Maps a session result to the frame sent back to the same client.
fn reply_for(result: Result<Option<UserId>, RelayError>) -> Option<String> {
    match result {
        Ok(Some(user_id)) => ServerEvent::Registered { user_id }.to_json(),
        Ok(None) => None,
        Err(e) => ServerEvent::from(&e).to_json(),
    }
}
