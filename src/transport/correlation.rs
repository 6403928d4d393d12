//! Request/reply correlation engine.
//!
//! Multiplexes any number of in-flight requests over the current socket.
//! Each request gets the next [`MessageId`]; each reply is matched back to
//! its caller by the echoed `message-id`. Frames carrying an `update-type`
//! go to the event router instead.
//!
//! # Dispatch Rules
//!
//! | Inbound frame | Outcome |
//! |---------------|---------|
//! | Not a JSON object | `error` event, frame dropped |
//! | Has `update-type` | Routed to application events |
//! | Known id, status not `error` | Caller resolved with the reply |
//! | Known id, status `error` | Caller rejected with [`Error::Server`] |
//! | Unknown id, status `error` | `error` event with the reply |
//! | Unknown id, otherwise | Dropped |

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::events::{EventEmitter, EventName, router};
use crate::identifiers::MessageId;
use crate::protocol::{Inbound, Reply, Request, decode_object};

use super::socket::{SignalHandler, Socket, SocketSignal};

// ============================================================================
// Constants
// ============================================================================

/// Tracing target used to echo inbound frames in debug mode.
pub const FRAME_LOG_TARGET: &str = "obs_remote::frames";

// ============================================================================
// Types
// ============================================================================

/// Map of request IDs to waiting callers.
type CorrelationMap = FxHashMap<MessageId, PendingRequest>;

/// Receives the outcome of one request.
pub(crate) type ReplyReceiver = oneshot::Receiver<Result<Reply>>;

/// One in-flight request.
struct PendingRequest {
    /// Socket the request went out on.
    epoch: u64,
    /// Completion handle.
    reply_tx: oneshot::Sender<Result<Reply>>,
}

/// The socket currently used for sending.
struct Attached {
    epoch: u64,
    socket: Socket,
}

// ============================================================================
// Correlator
// ============================================================================

/// Correlation engine shared by a client and its socket handlers.
///
/// Identifiers come from a counter owned by this instance; they keep
/// growing across reconnects and are never reused.
pub struct Correlator {
    /// Next request identifier.
    next_id: AtomicU64,
    /// Next socket epoch.
    next_epoch: AtomicU64,
    /// In-flight requests.
    pending: Mutex<CorrelationMap>,
    /// Current transport handle.
    socket: Mutex<Option<Attached>>,
    /// Where events are published.
    emitter: Arc<dyn EventEmitter>,
    /// Echo inbound frames when set.
    debug: AtomicBool,
}

impl Correlator {
    /// Creates an engine with no socket attached.
    #[must_use]
    pub fn new(emitter: Arc<dyn EventEmitter>) -> Self {
        Self {
            next_id: AtomicU64::new(MessageId::FIRST.get()),
            next_epoch: AtomicU64::new(0),
            pending: Mutex::new(CorrelationMap::default()),
            socket: Mutex::new(None),
            emitter,
            debug: AtomicBool::new(false),
        }
    }

    /// Enables or disables echoing of inbound frames.
    #[inline]
    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    /// Returns `true` if inbound frames are echoed.
    #[inline]
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns `true` while a socket is attached.
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.socket.lock().is_some()
    }

    // ========================================================================
    // Socket Lifecycle
    // ========================================================================

    /// Creates the handler for a socket that is about to open.
    ///
    /// The returned epoch must be passed to [`attach`](Self::attach) along
    /// with the socket. The handler holds only a weak reference, so a socket
    /// never keeps its engine alive.
    pub fn signal_handler(self: &Arc<Self>) -> (u64, SignalHandler) {
        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);
        let engine: Weak<Self> = Arc::downgrade(self);

        let handler: SignalHandler = Arc::new(move |signal| {
            if let Some(engine) = engine.upgrade() {
                engine.on_signal(epoch, signal);
            }
        });

        (epoch, handler)
    }

    /// Makes `socket` the transport for new requests.
    ///
    /// A previously attached socket is detached and closed.
    pub fn attach(&self, epoch: u64, socket: Socket) {
        let previous = self.socket.lock().replace(Attached { epoch, socket });
        if let Some(previous) = previous {
            self.retire(previous);
        }
        debug!(epoch, "Socket attached");
    }

    /// Detaches and closes the current socket.
    ///
    /// The socket's handler is removed before the close, so it reports
    /// nothing further; its pending requests fail with
    /// [`Error::ConnectionClosed`]. Returns `false` if nothing was attached.
    pub fn detach(&self) -> bool {
        let previous = self.socket.lock().take();
        match previous {
            Some(previous) => {
                self.retire(previous);
                true
            }
            None => false,
        }
    }

    /// Closes the current socket, keeping its handler.
    ///
    /// `socket.close` is still published and pending requests fail once the
    /// close completes. Returns `false` if nothing was attached.
    pub fn close(&self) -> bool {
        let previous = self.socket.lock().take();
        match previous {
            Some(Attached { epoch, socket }) => {
                debug!(epoch, "Closing socket");
                socket.close();
                true
            }
            None => false,
        }
    }

    /// Silences and closes a superseded socket.
    fn retire(&self, Attached { epoch, socket }: Attached) {
        socket.detach();
        socket.close();
        self.fail_pending(epoch);
        debug!(epoch, "Socket detached");
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Sends a request and waits for its reply.
    ///
    /// There is no timeout: a request the server never answers stays
    /// pending until its socket closes.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if no socket is attached
    /// - [`Error::Protocol`] if the body is not a JSON object
    /// - [`Error::ConnectionClosed`] if the socket closes first
    /// - [`Error::Server`] if the server reports a failure
    pub async fn send_request(&self, body: impl Serialize) -> Result<Reply> {
        let (_, reply_rx) = self.dispatch(body)?;
        reply_rx.await.map_err(|_| Error::ConnectionClosed)?
    }

    /// Registers and sends a request without waiting.
    ///
    /// Fails before touching any state when no socket is attached.
    pub(crate) fn dispatch(&self, body: impl Serialize) -> Result<(MessageId, ReplyReceiver)> {
        let slot = self.socket.lock();
        let Some(attached) = slot.as_ref() else {
            return Err(Error::NotConnected);
        };

        let request = Request::from_body(body)?;
        let request_type = request.request_type().unwrap_or_default().to_string();

        let id = MessageId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let frame = request.encode(id)?;

        // Store correlation before sending
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.lock().insert(
            id,
            PendingRequest {
                epoch: attached.epoch,
                reply_tx,
            },
        );

        if let Err(e) = attached.socket.send(frame) {
            self.pending.lock().remove(&id);
            return Err(e);
        }

        trace!(%id, request_type, "Request sent");
        Ok((id, reply_rx))
    }

    // ========================================================================
    // Inbound
    // ========================================================================

    /// Handles one signal from the socket with the given epoch.
    pub(crate) fn on_signal(&self, epoch: u64, signal: SocketSignal) {
        match signal {
            SocketSignal::Opened => {
                debug!(epoch, "Socket opened");
                self.emitter.publish(EventName::SocketOpen, &Value::Null);
            }

            SocketSignal::Frame(text) => self.on_frame(&text),

            SocketSignal::Errored(message) => {
                self.emitter
                    .publish(EventName::SocketError, &json!({ "error": message }));
            }

            SocketSignal::Closed(event) => {
                debug!(epoch, code = event.code, reason = %event.reason, "Socket closed");

                // A superseded socket must not clear its successor
                let current = {
                    let mut slot = self.socket.lock();
                    if slot.as_ref().is_some_and(|a| a.epoch == epoch) {
                        slot.take()
                    } else {
                        None
                    }
                };
                drop(current);

                self.fail_pending(epoch);
                self.emitter.publish(EventName::SocketClose, &event.to_value());
            }
        }
    }

    /// Handles one inbound text frame.
    pub(crate) fn on_frame(&self, text: &str) {
        let object = match decode_object(text) {
            Ok(object) => object,
            Err(e) => {
                warn!(error = %e, "Discarding undecodable frame");
                self.emitter.publish(
                    EventName::Error,
                    &json!({ "error": e.to_string(), "raw": text }),
                );
                return;
            }
        };

        if self.debug() {
            info!(target: FRAME_LOG_TARGET, frame = %text, "Inbound frame");
        }

        match Inbound::classify(object) {
            Inbound::Update(update) => {
                router::route(update, self.emitter.as_ref());
            }
            Inbound::Reply(reply) => self.resolve(reply),
        }
    }

    /// Completes the caller waiting for `reply`, if any.
    fn resolve(&self, reply: Reply) {
        let id = reply.message_id().and_then(MessageId::from_wire);
        let pending = id.and_then(|id| self.pending.lock().remove(&id));

        match pending {
            Some(pending) => {
                let outcome = if reply.is_error() {
                    Err(Error::server(reply))
                } else {
                    Ok(reply)
                };

                if pending.reply_tx.send(outcome).is_err() {
                    trace!(?id, "Caller dropped before reply arrived");
                }
            }

            None if reply.is_error() => {
                warn!(
                    message_id = ?reply.message_id(),
                    error = ?reply.error(),
                    "Error reply for unknown request"
                );
                self.emitter.publish(EventName::Error, &reply.into_value());
            }

            None => {
                trace!(message_id = ?reply.message_id(), "Dropping reply for unknown request");
            }
        }
    }

    /// Fails every request sent on the socket with `epoch`.
    fn fail_pending(&self, epoch: u64) {
        let failed: Vec<PendingRequest> = self
            .pending
            .lock()
            .extract_if(|_, pending| pending.epoch == epoch)
            .map(|(_, pending)| pending)
            .collect();
        let count = failed.len();

        for pending in failed {
            let _ = pending.reply_tx.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(epoch, count, "Failed pending requests on close");
        }
    }
}

impl std::fmt::Debug for Correlator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Correlator")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .field("pending", &self.pending_count())
            .field("attached", &self.is_attached())
            .field("debug", &self.debug())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use serde_json::from_str;
    use tokio::sync::mpsc;
    use tokio::sync::oneshot::error::TryRecvError;
    use tracing_subscriber::EnvFilter;

    use crate::events::EventBus;
    use crate::protocol::Command;
    use crate::transport::CloseEvent;
    use crate::transport::socket::SocketCommand;

    struct Harness {
        engine: Arc<Correlator>,
        events: Arc<Mutex<Vec<(EventName, Value)>>>,
        epoch: u64,
        outbound: mpsc::UnboundedReceiver<SocketCommand>,
    }

    impl Harness {
        fn new() -> Self {
            let bus = Arc::new(EventBus::new());
            let events = Arc::new(Mutex::new(Vec::new()));
            for event in EventName::ALL {
                let sink = Arc::clone(&events);
                bus.subscribe(
                    event,
                    Arc::new(move |payload: &Value| sink.lock().push((event, payload.clone()))),
                );
            }

            let engine = Arc::new(Correlator::new(bus));
            let (epoch, outbound) = Self::attach_new(&engine);

            Self {
                engine,
                events,
                epoch,
                outbound,
            }
        }

        fn attach_new(engine: &Arc<Correlator>) -> (u64, mpsc::UnboundedReceiver<SocketCommand>) {
            let (epoch, handler) = engine.signal_handler();
            let (socket, outbound) = Socket::test_pair(Some(handler));
            engine.attach(epoch, socket);
            (epoch, outbound)
        }

        fn sent(&mut self) -> Value {
            match self.outbound.try_recv() {
                Ok(SocketCommand::Send(text)) => from_str(&text).expect("json frame"),
                other => panic!("expected a sent frame, got {other:?}"),
            }
        }

        fn events(&self) -> Vec<(EventName, Value)> {
            self.events.lock().clone()
        }
    }

    #[test]
    fn test_send_without_socket_fails_immediately() {
        let engine = Correlator::new(Arc::new(EventBus::new()));

        let err = engine.dispatch(Command::GetVersion).unwrap_err();
        assert!(matches!(err, Error::NotConnected));
        assert_eq!(engine.pending_count(), 0);

        // No identifier was consumed
        let engine = Arc::new(engine);
        let (_epoch, _outbound) = Harness::attach_new(&engine);
        let (id, _rx) = engine.dispatch(Command::GetVersion).expect("dispatch");
        assert_eq!(id, MessageId::FIRST);
    }

    #[test]
    fn test_outbound_frame_shape() {
        let mut h = Harness::new();
        let (id, _rx) = h
            .engine
            .dispatch(Command::SetCurrentScene {
                scene_name: "Scene A".into(),
            })
            .expect("dispatch");

        assert_eq!(
            h.sent(),
            json!({
                "request-type": "SetCurrentScene",
                "scene-name": "Scene A",
                "message-id": id.to_string()
            })
        );
    }

    #[test]
    fn test_non_object_body_is_rejected_without_state_change() {
        let mut h = Harness::new();
        let err = h.engine.dispatch(json!("GetVersion")).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
        assert_eq!(h.engine.pending_count(), 0);
        assert!(h.outbound.try_recv().is_err());

        let (id, _rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");
        assert_eq!(id, MessageId::FIRST);
    }

    #[test]
    fn test_reply_resolves_caller() {
        let h = Harness::new();
        let (id, mut rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");

        h.engine.on_frame(
            &json!({ "message-id": id.to_string(), "status": "ok", "obs-websocket-version": "4.8.0" })
                .to_string(),
        );

        let reply = rx.try_recv().expect("resolved").expect("ok reply");
        assert_eq!(reply.get_string("obs-websocket-version"), "4.8.0");
        assert_eq!(h.engine.pending_count(), 0);
        assert!(h.events().is_empty());
    }

    #[test]
    fn test_error_reply_rejects_only_its_caller() {
        let h = Harness::new();
        let (first, mut first_rx) = h.engine.dispatch(Command::GetSceneList).expect("dispatch");
        let (_second, mut second_rx) = h.engine.dispatch(Command::GetSceneList).expect("dispatch");

        let payload = json!({
            "message-id": first.to_string(),
            "status": "error",
            "error": "boom"
        });
        h.engine.on_frame(&payload.to_string());

        match first_rx.try_recv().expect("resolved") {
            Err(Error::Server { error, reply }) => {
                assert_eq!(error, "boom");
                assert_eq!(reply.into_value(), payload);
            }
            other => panic!("expected server error, got {other:?}"),
        }
        assert!(matches!(second_rx.try_recv(), Err(TryRecvError::Empty)));
        assert!(h.events().is_empty());
    }

    #[test]
    fn test_orphaned_error_reply_publishes_error_event() {
        let h = Harness::new();
        let (_id, mut rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");

        let payload = json!({ "message-id": "99", "status": "error", "error": "bad id" });
        h.engine.on_frame(&payload.to_string());

        assert_eq!(h.events(), vec![(EventName::Error, payload)]);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(h.engine.pending_count(), 1);
    }

    #[test]
    fn test_orphaned_ok_reply_is_dropped_silently() {
        let h = Harness::new();
        let (_id, mut rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");

        h.engine
            .on_frame(&json!({ "message-id": "42", "status": "ok" }).to_string());
        h.engine.on_frame(&json!({ "status": "ok" }).to_string());

        assert!(h.events().is_empty());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_duplicate_reply_after_resolution() {
        let h = Harness::new();
        let (id, mut rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");

        let ok = json!({ "message-id": id.to_string(), "status": "ok" }).to_string();
        h.engine.on_frame(&ok);
        h.engine.on_frame(&ok);
        assert!(rx.try_recv().expect("resolved").is_ok());
        assert!(h.events().is_empty());

        let err = json!({ "message-id": id.to_string(), "status": "error", "error": "late" });
        h.engine.on_frame(&err.to_string());
        assert_eq!(h.events(), vec![(EventName::Error, err)]);
    }

    #[test]
    fn test_non_canonical_id_does_not_match() {
        let h = Harness::new();
        let (_id, mut rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");

        h.engine
            .on_frame(&json!({ "message-id": "01", "status": "ok" }).to_string());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_undecodable_frame_emits_one_error_event() {
        let h = Harness::new();
        let (_id, mut rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");

        h.engine.on_frame("{ definitely not json");

        let events = h.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, EventName::Error);
        assert_eq!(events[0].1["raw"], "{ definitely not json");
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(h.engine.pending_count(), 1);
    }

    #[test]
    fn test_update_is_routed_not_correlated() {
        let h = Harness::new();
        let (id, mut rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");

        let update = json!({
            "update-type": "SwitchScenes",
            "message-id": id.to_string(),
            "scene-name": "Scene B"
        });
        h.engine.on_frame(&update.to_string());

        assert_eq!(h.events(), vec![(EventName::ScenesSwitch, update)]);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    /// Collects formatted `tracing` output.
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn echoed_lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock())
                .lines()
                .filter(|line| line.contains("Inbound frame"))
                .map(str::to_string)
                .collect()
        }
    }

    /// Feeds `frames` to a fresh engine while capturing the frame echo target.
    fn echo_of(debug: bool, frames: &[String]) -> (CapturedLog, Harness) {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(format!("{FRAME_LOG_TARGET}=info")))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let h = Harness::new();
        h.engine.set_debug(debug);
        tracing::subscriber::with_default(subscriber, || {
            for frame in frames {
                h.engine.on_frame(frame);
            }
        });
        (log, h)
    }

    #[test]
    fn test_debug_echoes_each_decoded_frame() {
        let frames = vec![
            json!({ "message-id": "1", "status": "ok" }).to_string(),
            json!({ "update-type": "StreamStarting" }).to_string(),
            "{ not json".to_string(),
            "[1, 2]".to_string(),
        ];

        let (log, h) = echo_of(true, &frames);

        let lines = log.echoed_lines();
        assert_eq!(lines.len(), 2, "captured: {lines:?}");
        assert!(lines[0].contains("message-id"));
        assert!(lines[1].contains("StreamStarting"));
        assert!(lines.iter().all(|line| line.contains(FRAME_LOG_TARGET)));

        // Echo does not change dispatch
        let names: Vec<EventName> = h.events().into_iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec![EventName::StreamStart, EventName::Error, EventName::Error]
        );
    }

    #[test]
    fn test_no_echo_without_debug() {
        let frames = vec![json!({ "update-type": "SwitchScenes" }).to_string()];

        let (log, h) = echo_of(false, &frames);

        assert!(log.echoed_lines().is_empty());
        assert_eq!(h.events().len(), 1);
    }

    #[test]
    fn test_debug_echo_resolves_caller() {
        let h = Harness::new();
        h.engine.set_debug(true);
        let (id, mut rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");

        h.engine
            .on_frame(&json!({ "message-id": id.to_string(), "status": "ok" }).to_string());
        assert!(rx.try_recv().expect("resolved").is_ok());
    }

    #[test]
    fn test_socket_signals_publish_events() {
        let h = Harness::new();

        h.engine.on_signal(h.epoch, SocketSignal::Opened);
        h.engine
            .on_signal(h.epoch, SocketSignal::Errored("reset".into()));

        assert_eq!(
            h.events(),
            vec![
                (EventName::SocketOpen, Value::Null),
                (EventName::SocketError, json!({ "error": "reset" })),
            ]
        );
    }

    #[test]
    fn test_close_fails_pending_and_clears_socket() {
        let h = Harness::new();
        let (_id, mut rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");

        h.engine.on_signal(
            h.epoch,
            SocketSignal::Closed(CloseEvent::new(1001, "going away")),
        );

        assert!(matches!(rx.try_recv(), Ok(Err(Error::ConnectionClosed))));
        assert!(!h.engine.is_attached());
        assert_eq!(
            h.events(),
            vec![(EventName::SocketClose, json!({ "code": 1001, "reason": "going away" }))]
        );
        assert!(matches!(
            h.engine.dispatch(Command::GetVersion),
            Err(Error::NotConnected)
        ));
    }

    #[test]
    fn test_stale_close_only_fails_its_own_requests() {
        let h = Harness::new();
        let (_old, mut old_rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");

        // Closing hands the socket back; its close arrives after a reconnect
        assert!(h.engine.close());
        let (_new_epoch, _outbound) = Harness::attach_new(&h.engine);
        let (new_id, mut new_rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");

        h.engine
            .on_signal(h.epoch, SocketSignal::Closed(CloseEvent::normal()));

        assert!(matches!(old_rx.try_recv(), Ok(Err(Error::ConnectionClosed))));
        assert!(matches!(new_rx.try_recv(), Err(TryRecvError::Empty)));
        assert!(h.engine.is_attached());
        assert_eq!(new_id, MessageId::new(2));
    }

    #[test]
    fn test_reattach_keeps_counter_and_fails_superseded_requests() {
        let mut h = Harness::new();
        let (_a, mut a_rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");
        let _ = h.sent();

        let (_epoch, mut outbound) = Harness::attach_new(&h.engine);

        // Old socket was told to close and its caller failed
        assert_eq!(h.outbound.try_recv().ok(), Some(SocketCommand::Close));
        assert!(matches!(a_rx.try_recv(), Ok(Err(Error::ConnectionClosed))));

        let (b, _b_rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");
        assert_eq!(b, MessageId::new(2));
        assert!(matches!(outbound.try_recv(), Ok(SocketCommand::Send(_))));
    }

    #[test]
    fn test_detach_silences_old_socket() {
        let h = Harness::new();
        assert!(h.engine.detach());
        assert!(!h.engine.detach());
        assert!(!h.engine.is_attached());
        assert!(h.events().is_empty());
    }

    #[test]
    fn test_send_request_resolves_asynchronously() {
        let h = Harness::new();
        let engine = Arc::clone(&h.engine);

        tokio_test::block_on(async move {
            let request = engine.send_request(Command::GetSceneList);
            let reply = async {
                tokio::task::yield_now().await;
                engine.on_frame(&json!({ "message-id": "1", "status": "ok", "scenes": [] }).to_string());
            };

            let (result, ()) = tokio::join!(request, reply);
            let reply = result.expect("reply");
            assert_eq!(reply.get("scenes"), Some(&json!([])));
        });
    }

    proptest! {
        #[test]
        fn prop_identifiers_are_sequential(count in 1usize..64) {
            let mut h = Harness::new();
            let mut receivers = Vec::new();

            for expected in 1..=count as u64 {
                let (id, rx) = h.engine.dispatch(Command::GetVersion).expect("dispatch");
                let frame = h.sent();
                let wire_id = expected.to_string();
                prop_assert_eq!(id, MessageId::new(expected));
                prop_assert_eq!(frame["message-id"].as_str(), Some(wire_id.as_str()));
                receivers.push(rx);
            }

            prop_assert_eq!(h.engine.pending_count(), count);
        }

        #[test]
        fn prop_out_of_order_replies_reach_their_callers(
            order in (1usize..24).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
        ) {
            let h = Harness::new();
            let mut receivers: Vec<(MessageId, ReplyReceiver)> = (0..order.len())
                .map(|_| h.engine.dispatch(Command::GetVersion).expect("dispatch"))
                .collect();

            for &index in &order {
                let id = receivers[index].0;
                h.engine.on_frame(
                    &json!({ "message-id": id.to_string(), "status": "ok", "tag": index }).to_string(),
                );
            }

            for (index, (id, rx)) in receivers.iter_mut().enumerate() {
                let reply = rx.try_recv().expect("resolved").expect("ok reply");
                let wire_id = id.to_string();
                prop_assert_eq!(reply.message_id(), Some(wire_id.as_str()));
                prop_assert_eq!(reply.get_u64("tag"), index as u64);
            }
            prop_assert_eq!(h.engine.pending_count(), 0);
        }
    }
}
