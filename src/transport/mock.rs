//! In-process obs-websocket server for tests.
//!
//! Accepts connections one after another on a random localhost port. Every
//! text frame the client sends is decoded and queued for the test to
//! inspect; an optional [`Responder`] answers requests automatically.

// ============================================================================
// Imports
// ============================================================================

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Map, Value, from_str, json};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use crate::client::auth::challenge_response;

// ============================================================================
// Types
// ============================================================================

/// Computes an automatic reply for a decoded request.
pub(crate) type Responder = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Something the test wants the server to do.
enum MockAction {
    Send(String),
    Close(u16),
    Drop,
}

// ============================================================================
// MockServer
// ============================================================================

pub(crate) struct MockServer {
    port: u16,
    received_rx: mpsc::UnboundedReceiver<Value>,
    action_tx: mpsc::UnboundedSender<MockAction>,
    close_replies: Arc<AtomicUsize>,
}

impl MockServer {
    /// Binds to a random port and starts serving.
    pub(crate) async fn start(responder: Option<Responder>) -> Self {
        Self::spawn(responder, None).await
    }

    /// Serves connections that are closed with `code` right after the
    /// WebSocket handshake.
    pub(crate) async fn start_closing(code: u16) -> Self {
        Self::spawn(None, Some(code)).await
    }

    async fn spawn(responder: Option<Responder>, close_on_accept: Option<u16>) -> Self {
        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .await
            .expect("bind should succeed");
        let port = listener.local_addr().expect("local addr").port();

        let (received_tx, received_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let close_replies = Arc::new(AtomicUsize::new(0));

        tokio::spawn(serve(
            listener,
            responder,
            close_on_accept,
            received_tx,
            action_rx,
            Arc::clone(&close_replies),
        ));

        Self {
            port,
            received_rx,
            action_tx,
            close_replies,
        }
    }

    pub(crate) fn port(&self) -> u16 {
        self.port
    }

    pub(crate) fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    /// Next frame sent by the client.
    pub(crate) async fn next_request(&mut self) -> Value {
        timeout(Duration::from_secs(5), self.received_rx.recv())
            .await
            .expect("timed out waiting for a request")
            .expect("mock server stopped")
    }

    /// Frames received so far that the test has not consumed.
    pub(crate) fn drain(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.received_rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Sends a JSON frame to the client.
    pub(crate) fn push(&self, frame: Value) {
        self.push_raw(&frame.to_string());
    }

    /// Sends raw text to the client.
    pub(crate) fn push_raw(&self, text: &str) {
        let _ = self.action_tx.send(MockAction::Send(text.to_string()));
    }

    /// Closes the current connection with a close frame.
    pub(crate) fn close_with(&self, code: u16) {
        let _ = self.action_tx.send(MockAction::Close(code));
    }

    /// Close frames the client sent back after [`close_with`](Self::close_with).
    pub(crate) fn close_replies(&self) -> usize {
        self.close_replies.load(Ordering::SeqCst)
    }

    /// Drops the current connection without a close frame.
    pub(crate) fn drop_connection(&self) {
        let _ = self.action_tx.send(MockAction::Drop);
    }
}

async fn serve(
    listener: TcpListener,
    responder: Option<Responder>,
    close_on_accept: Option<u16>,
    received_tx: mpsc::UnboundedSender<Value>,
    mut action_rx: mpsc::UnboundedReceiver<MockAction>,
    close_replies: Arc<AtomicUsize>,
) {
    while let Ok((stream, _)) = listener.accept().await {
        let Ok(ws_stream) = accept_async(stream).await else {
            continue;
        };
        let (mut write, mut read) = ws_stream.split();

        if let Some(code) = close_on_accept {
            let _ = write.send(Message::Close(Some(close_frame(code)))).await;
            continue;
        }

        loop {
            tokio::select! {
                message = read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            let request: Value = from_str(text.as_str()).unwrap_or(Value::Null);
                            let reply = responder.as_ref().and_then(|r| r(&request));
                            let _ = received_tx.send(request);
                            if let Some(reply) = reply {
                                let _ = write.send(Message::Text(reply.to_string().into())).await;
                            }
                        }
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        _ => {}
                    }
                }

                action = action_rx.recv() => {
                    match action {
                        Some(MockAction::Send(text)) => {
                            let _ = write.send(Message::Text(text.into())).await;
                        }
                        Some(MockAction::Close(code)) => {
                            let _ = write.send(Message::Close(Some(close_frame(code)))).await;

                            // Wait for the client to complete the handshake
                            let reply = timeout(Duration::from_secs(1), read.next()).await;
                            if let Ok(Some(Ok(Message::Close(_)))) = reply {
                                close_replies.fetch_add(1, Ordering::SeqCst);
                            }
                            break;
                        }
                        Some(MockAction::Drop) => break,
                        None => return,
                    }
                }
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn close_frame(code: u16) -> CloseFrame {
    CloseFrame {
        code: CloseCode::from(code),
        reason: String::new().into(),
    }
}

/// A localhost port with nothing listening on it.
pub(crate) fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind");
    listener.local_addr().expect("local addr").port()
}

/// Success reply echoing the request's `message-id`.
pub(crate) fn ok_reply(request: &Value, fields: Value) -> Value {
    reply(request, "ok", fields)
}

/// Error reply echoing the request's `message-id`.
pub(crate) fn error_reply(request: &Value, error: &str) -> Value {
    reply(request, "error", json!({ "error": error }))
}

fn reply(request: &Value, status: &str, fields: Value) -> Value {
    let mut object = Map::new();
    object.insert("message-id".into(), request["message-id"].clone());
    object.insert("status".into(), Value::String(status.to_string()));
    if let Value::Object(fields) = fields {
        object.extend(fields);
    }
    Value::Object(object)
}

pub(crate) const TEST_SALT: &str = "PZVbYpvAnZut2SS6JNJytDm9";
pub(crate) const TEST_CHALLENGE: &str = "ztTBnnuqrqaKDzRM3xcVdbYm";

/// Answers the handshake and authentication requests like obs-websocket
/// 4.x. `password` set means authentication is required. Other requests get
/// no automatic reply.
pub(crate) fn obs_responder(version: &'static str, password: Option<&'static str>) -> Responder {
    Arc::new(move |request: &Value| {
        match request["request-type"].as_str()? {
            "GetVersion" => Some(ok_reply(
                request,
                json!({ "obs-websocket-version": version, "version": 1.1 }),
            )),
            "GetAuthRequired" => Some(match password {
                Some(_) => ok_reply(
                    request,
                    json!({ "authRequired": true, "salt": TEST_SALT, "challenge": TEST_CHALLENGE }),
                ),
                None => ok_reply(request, json!({ "authRequired": false })),
            }),
            "Authenticate" => {
                let expected = password.map(|p| challenge_response(p, TEST_SALT, TEST_CHALLENGE));
                Some(if request["auth"].as_str() == expected.as_deref() {
                    ok_reply(request, json!({}))
                } else {
                    error_reply(request, "Authentication Failed.")
                })
            }
            _ => None,
        }
    })
}
