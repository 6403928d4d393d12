//! WebSocket transport adapter.
//!
//! Owns one client-side WebSocket and reports what happens to it through a
//! single detachable handler. Knows nothing about message semantics.
//!
//! # Event Loop
//!
//! Starting the [`SocketDriver`] returned with an opened socket spawns a
//! tokio task that handles:
//!
//! - Incoming text frames (forwarded as [`SocketSignal::Frame`])
//! - Outgoing frames queued by [`Socket::send`]
//! - Close and error conditions (reported once, as [`SocketSignal::Closed`])

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::result::Result as StdResult;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Normal closure.
pub const CLOSE_NORMAL: u16 = 1000;

/// Close frame without a status code.
pub const CLOSE_NO_STATUS: u16 = 1005;

/// Connection lost or never established.
pub const CLOSE_ABNORMAL: u16 = 1006;

// ============================================================================
// Types
// ============================================================================

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Callback receiving every signal of one socket.
pub type SignalHandler = Arc<dyn Fn(SocketSignal) + Send + Sync>;

/// Slot holding the handler; `None` once detached.
type HandlerSlot = Arc<Mutex<Option<SignalHandler>>>;

// ============================================================================
// CloseEvent
// ============================================================================

/// Why a socket closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseEvent {
    /// WebSocket close code.
    pub code: u16,
    /// Close reason or transport error text.
    pub reason: String,
}

impl CloseEvent {
    /// Creates a close event.
    #[inline]
    #[must_use]
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Closed on request.
    #[inline]
    #[must_use]
    pub fn normal() -> Self {
        Self::new(CLOSE_NORMAL, "")
    }

    /// Lost, or never established.
    #[inline]
    #[must_use]
    pub fn abnormal(reason: impl Into<String>) -> Self {
        Self::new(CLOSE_ABNORMAL, reason)
    }

    /// Human readable description of the close code.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self.code {
            CLOSE_ABNORMAL => "Server not reachable",
            _ => "Unknown Error",
        }
    }

    /// Payload published with `socket.close`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({ "code": self.code, "reason": self.reason })
    }
}

impl fmt::Display for CloseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "closed with code {}", self.code)
        } else {
            write!(f, "closed with code {}: {}", self.code, self.reason)
        }
    }
}

// ============================================================================
// SocketSignal
// ============================================================================

/// Something that happened to a socket.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketSignal {
    /// The connection is open.
    Opened,
    /// A text frame arrived.
    Frame(String),
    /// A transport error occurred.
    Errored(String),
    /// The connection is gone. Always the last signal.
    Closed(CloseEvent),
}

// ============================================================================
// SocketCommand
// ============================================================================

/// Internal commands for the event loop.
#[derive(Debug, PartialEq)]
pub(crate) enum SocketCommand {
    /// Write a text frame.
    Send(String),
    /// Close the connection normally.
    Close,
}

// ============================================================================
// Socket
// ============================================================================

/// Handle to one open WebSocket.
///
/// Dropping the handle closes the connection.
pub struct Socket {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<SocketCommand>,
    /// Handler slot (shared with event loop).
    handler: HandlerSlot,
}

impl Socket {
    /// Opens a WebSocket to `url`.
    ///
    /// On success returns the handle together with the [`SocketDriver`]
    /// that runs its I/O. Nothing is signalled until the driver is started,
    /// so the caller can install the handle first. On failure the handler
    /// receives [`SocketSignal::Errored`] followed by [`SocketSignal::Closed`]
    /// with code 1006, and the same close event is returned.
    pub async fn open(
        url: &str,
        handler: SignalHandler,
    ) -> StdResult<(Self, SocketDriver), CloseEvent> {
        let handler: HandlerSlot = Arc::new(Mutex::new(Some(handler)));

        let ws_stream = match connect_async(url).await {
            Ok((ws_stream, _response)) => ws_stream,
            Err(e) => {
                warn!(%url, error = %e, "WebSocket connect failed");
                let event = CloseEvent::abnormal(e.to_string());
                Self::signal(&handler, SocketSignal::Errored(e.to_string()));
                Self::signal(&handler, SocketSignal::Closed(event.clone()));
                return Err(event);
            }
        };

        debug!(%url, "WebSocket connection established");

        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let driver = SocketDriver {
            ws_stream,
            command_rx,
            handler: Arc::clone(&handler),
        };

        Ok((
            Self {
                command_tx,
                handler,
            },
            driver,
        ))
    }

    /// Queues a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the event loop has ended.
    pub fn send(&self, text: String) -> Result<()> {
        self.command_tx
            .send(SocketCommand::Send(text))
            .map_err(|_| Error::ConnectionClosed)
    }

    /// Removes the handler. No signal is delivered after this returns.
    pub fn detach(&self) {
        *self.handler.lock() = None;
    }

    /// Closes the connection normally.
    ///
    /// An attached handler still receives [`SocketSignal::Closed`].
    pub fn close(&self) {
        let _ = self.command_tx.send(SocketCommand::Close);
    }

    /// Returns `true` once the event loop has ended.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Delivers a signal to the handler, if still attached.
    ///
    /// The slot stays locked while the handler runs so that `detach` waits
    /// for an in-flight delivery.
    fn signal(handler: &HandlerSlot, signal: SocketSignal) {
        let guard = handler.lock();
        if let Some(ref handler) = *guard {
            handler(signal);
        }
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<SocketCommand>,
        handler: HandlerSlot,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        let close_event = loop {
            tokio::select! {
                // Incoming frames from the server
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            trace!(len = text.len(), "Frame received");
                            Self::signal(&handler, SocketSignal::Frame(text.to_string()));
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by remote");
                            let event = match frame {
                                Some(frame) => CloseEvent::new(u16::from(frame.code), frame.reason.as_str()),
                                None => CloseEvent::new(CLOSE_NO_STATUS, ""),
                            };
                            // Flush the queued close reply
                            let _ = ws_write.close().await;
                            break event;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            Self::signal(&handler, SocketSignal::Errored(e.to_string()));
                            break CloseEvent::abnormal(e.to_string());
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break CloseEvent::abnormal("stream ended");
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Commands from the client
                command = command_rx.recv() => {
                    match command {
                        Some(SocketCommand::Send(text)) => {
                            if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                                warn!(error = %e, "Failed to send frame");
                                Self::signal(&handler, SocketSignal::Errored(e.to_string()));
                            }
                        }

                        Some(SocketCommand::Close) => {
                            debug!("Close requested");
                            let _ = ws_write.close().await;
                            break CloseEvent::normal();
                        }

                        None => {
                            debug!("Socket handle dropped");
                            let _ = ws_write.close().await;
                            break CloseEvent::normal();
                        }
                    }
                }
            }
        };

        Self::signal(&handler, SocketSignal::Closed(close_event));

        debug!("Socket event loop terminated");
    }
}

impl fmt::Debug for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socket")
            .field("closed", &self.is_closed())
            .field("attached", &self.handler.lock().is_some())
            .finish()
    }
}

// ============================================================================
// SocketDriver
// ============================================================================

/// The not-yet-running I/O half of a freshly opened [`Socket`].
///
/// Dropping it without calling [`start`](Self::start) closes the
/// connection without signalling.
pub struct SocketDriver {
    ws_stream: WsStream,
    command_rx: mpsc::UnboundedReceiver<SocketCommand>,
    handler: HandlerSlot,
}

impl SocketDriver {
    /// Signals [`SocketSignal::Opened`] and spawns the event loop.
    ///
    /// `Opened` reaches the handler before any frame does.
    pub fn start(self) {
        let Self {
            ws_stream,
            command_rx,
            handler,
        } = self;

        Socket::signal(&handler, SocketSignal::Opened);
        tokio::spawn(Socket::run_event_loop(ws_stream, command_rx, handler));
    }
}

impl fmt::Debug for SocketDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketDriver")
            .field("attached", &self.handler.lock().is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Test Support
// ============================================================================

#[cfg(test)]
impl Socket {
    /// A socket backed by a bare channel instead of a network connection.
    pub(crate) fn test_pair(
        handler: Option<SignalHandler>,
    ) -> (Self, mpsc::UnboundedReceiver<SocketCommand>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let socket = Self {
            command_tx,
            handler: Arc::new(Mutex::new(handler)),
        };
        (socket, command_rx)
    }

    /// Delivers a signal as if it came from the event loop.
    pub(crate) fn emit(&self, signal: SocketSignal) {
        Self::signal(&self.handler, signal);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use serde_json::json;
    use tokio::time::{sleep, timeout};

    use crate::transport::mock::{MockServer, unused_port};

    fn recording_handler() -> (Arc<Mutex<Vec<SocketSignal>>>, SignalHandler) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: SignalHandler = Arc::new(move |signal| sink.lock().push(signal));
        (seen, handler)
    }

    async fn wait_for(seen: &Arc<Mutex<Vec<SocketSignal>>>, count: usize) {
        timeout(Duration::from_secs(5), async {
            while seen.lock().len() < count {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("signals should arrive");
    }

    #[test]
    fn test_close_event_reasons() {
        assert_eq!(CloseEvent::abnormal("x").describe(), "Server not reachable");
        assert_eq!(CloseEvent::normal().describe(), "Unknown Error");
        assert_eq!(CloseEvent::new(4001, "").describe(), "Unknown Error");
        assert_eq!(
            CloseEvent::new(1001, "going away").to_value(),
            json!({ "code": 1001, "reason": "going away" })
        );
    }

    #[test]
    fn test_send_fails_after_loop_ends() {
        let (socket, command_rx) = Socket::test_pair(None);
        drop(command_rx);

        assert!(socket.is_closed());
        assert!(matches!(
            socket.send("{}".to_string()),
            Err(Error::ConnectionClosed)
        ));
    }

    #[test]
    fn test_detach_silences_handler() {
        let (seen, handler) = recording_handler();
        let (socket, _command_rx) = Socket::test_pair(Some(handler));

        socket.emit(SocketSignal::Opened);
        socket.detach();
        socket.emit(SocketSignal::Frame("{}".into()));
        socket.emit(SocketSignal::Closed(CloseEvent::normal()));

        assert_eq!(seen.lock().as_slice(), &[SocketSignal::Opened]);
    }

    #[tokio::test]
    async fn test_open_unreachable_reports_1006() {
        let (seen, handler) = recording_handler();
        let url = format!("ws://127.0.0.1:{}", unused_port());

        let event = Socket::open(&url, handler).await.unwrap_err();
        assert_eq!(event.code, CLOSE_ABNORMAL);

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[0], SocketSignal::Errored(_)));
        assert_eq!(seen[1], SocketSignal::Closed(event.clone()));
    }

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let mut server = MockServer::start(None).await;
        let (seen, handler) = recording_handler();

        let (socket, driver) = Socket::open(&server.ws_url(), handler)
            .await
            .expect("open");
        assert!(seen.lock().is_empty());

        driver.start();
        assert_eq!(seen.lock().first(), Some(&SocketSignal::Opened));

        socket
            .send(json!({ "hello": "server" }).to_string())
            .expect("send");
        assert_eq!(server.next_request().await, json!({ "hello": "server" }));

        server.push(json!({ "hello": "client" }));
        wait_for(&seen, 2).await;

        match &seen.lock()[1] {
            SocketSignal::Frame(text) => {
                let value: Value = serde_json::from_str(text).expect("json");
                assert_eq!(value, json!({ "hello": "client" }));
            }
            other => panic!("unexpected signal: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remote_close_code_is_reported() {
        let server = MockServer::start(None).await;
        let (seen, handler) = recording_handler();

        let (_socket, driver) = Socket::open(&server.ws_url(), handler)
            .await
            .expect("open");
        driver.start();

        server.close_with(4009);
        wait_for(&seen, 2).await;

        match &seen.lock()[1] {
            SocketSignal::Closed(event) => assert_eq!(event.code, 4009),
            other => panic!("unexpected signal: {other:?}"),
        }

        // The client answered the close frame
        timeout(Duration::from_secs(2), async {
            while server.close_replies() == 0 {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("close reply should arrive");
    }

    #[tokio::test]
    async fn test_local_close_signals_normal_closure() {
        let server = MockServer::start(None).await;
        let (seen, handler) = recording_handler();

        let (socket, driver) = Socket::open(&server.ws_url(), handler)
            .await
            .expect("open");
        driver.start();
        socket.close();
        wait_for(&seen, 2).await;

        assert_eq!(
            seen.lock().last(),
            Some(&SocketSignal::Closed(CloseEvent::normal()))
        );
    }

    #[tokio::test]
    async fn test_close_before_start_is_reported_after_start() {
        let server = MockServer::start_closing(1001).await;
        let (seen, handler) = recording_handler();

        let (_socket, driver) = Socket::open(&server.ws_url(), handler)
            .await
            .expect("open");

        // The server has already hung up; nothing is reported until started
        sleep(Duration::from_millis(50)).await;
        assert!(seen.lock().is_empty());

        driver.start();
        wait_for(&seen, 2).await;

        let seen = seen.lock();
        assert_eq!(seen[0], SocketSignal::Opened);
        assert!(matches!(seen[1], SocketSignal::Closed(ref event) if event.code == 1001));
    }
}
