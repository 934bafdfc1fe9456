// ── Keypad connection lifecycle ──
//
// One logical connection to the device, kept alive forever:
//
//   Disconnected ──connect()──▶ Connecting ──opened──▶ Connected
//        ▲                          │                    │    │
//        │                     open failed          closed   error
//        │                          │                    │    ▼
//        └──── reconnect delay ◀────┴────────────────────┴── Closing
//
// A single background task owns the transport, the heartbeat interval,
// the reconnect timer and the mode tracker. Consumers only see watch
// receivers (levels) and a broadcast channel (edges).

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ad2kp_api::{
    Connector, ControlLine, ControlVerb, DeviceState, LineTransport, Message, ProtocolError,
    parse_line,
};

use crate::command::KeypadCommand;
use crate::config::KeypadConfig;
use crate::error::CoreError;
use crate::mode::{DisplayMode, ModeTracker, ModeTransition};

const COMMAND_CHANNEL_SIZE: usize = 64;
const EVENT_CHANNEL_SIZE: usize = 256;
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closing,
}

/// Edge notifications. Exactly one per state transition and one per
/// change of derived display mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeypadEvent {
    Connection(ConnectionState),
    ModeChanged(ModeTransition),
}

// ── Keypad ───────────────────────────────────────────────────────

/// Connection lifecycle manager for one keypad endpoint.
///
/// Cheaply cloneable via `Arc<KeypadInner>`. Construct it once and pass
/// it to whatever needs to send commands or read the mode.
pub struct Keypad<C: Connector> {
    inner: Arc<KeypadInner<C>>,
}

impl<C: Connector> Clone for Keypad<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct KeypadInner<C> {
    config: KeypadConfig,
    connector: C,
    state: watch::Sender<ConnectionState>,
    mode: watch::Sender<DisplayMode>,
    snapshot: watch::Sender<Option<Arc<DeviceState>>>,
    event_tx: broadcast::Sender<KeypadEvent>,
    outbound_tx: mpsc::Sender<String>,
    outbound_rx: Mutex<Option<mpsc::Receiver<String>>>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Connector> Keypad<C> {
    /// Create a keypad. Does NOT connect -- call [`connect()`](Self::connect).
    pub fn new(config: KeypadConfig, connector: C) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (mode, _) = watch::channel(DisplayMode::Unknown);
        let (snapshot, _) = watch::channel(None);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let (outbound_tx, outbound_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Self {
            inner: Arc::new(KeypadInner {
                config,
                connector,
                state,
                mode,
                snapshot,
                event_tx,
                outbound_tx,
                outbound_rx: Mutex::new(Some(outbound_rx)),
                cancel: CancellationToken::new(),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn endpoint(&self) -> String {
        self.inner.connector.endpoint()
    }

    // ── Observation ──────────────────────────────────────────────

    pub fn connection_state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Last surfaced display mode.
    pub fn mode(&self) -> DisplayMode {
        *self.inner.mode.borrow()
    }

    /// Most recent good snapshot, if any arrived yet.
    pub fn snapshot(&self) -> Option<Arc<DeviceState>> {
        self.inner.snapshot.borrow().clone()
    }

    pub fn watch_snapshot(&self) -> watch::Receiver<Option<Arc<DeviceState>>> {
        self.inner.snapshot.subscribe()
    }

    /// Subscribe to lifecycle and mode-change edges.
    pub fn subscribe(&self) -> broadcast::Receiver<KeypadEvent> {
        self.inner.event_tx.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Start the background session. Returns immediately; the first
    /// connection attempt happens asynchronously. Calling it again while
    /// the session runs is a no-op.
    pub async fn connect(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ShutDown);
        }

        let mut task = self.inner.task.lock().await;
        if task.is_some() {
            debug!("keypad session already running");
            return Ok(());
        }

        let outbound = self
            .inner
            .outbound_rx
            .lock()
            .await
            .take()
            .ok_or(CoreError::ShutDown)?;

        let inner = Arc::clone(&self.inner);
        *task = Some(tokio::spawn(session_loop(inner, outbound)));
        Ok(())
    }

    /// Tear the session down: closes the live transport and cancels any
    /// pending heartbeat or reconnect timer. The keypad cannot be
    /// reconnected afterwards.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let handle = self.inner.task.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "keypad session task failed");
            }
        }
        debug!("keypad shut down");
    }

    // ── Outbound ─────────────────────────────────────────────────

    /// Forward a command token verbatim as `!SEND:<command>`.
    ///
    /// An empty command is a no-op. Anything else needs a live connection.
    pub async fn send_command(&self, command: &str) -> Result<(), CoreError> {
        if command.is_empty() {
            return Ok(());
        }
        self.send_line(ControlLine::send(command).to_string()).await
    }

    /// Send a typed keypad command.
    pub async fn send(&self, command: KeypadCommand) -> Result<(), CoreError> {
        self.send_command(&command.token()).await
    }

    /// Re-issue the synchronization request so the device pushes a fresh
    /// snapshot.
    pub async fn request_sync(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;
        self.send_line(ControlLine::sync(config.partition, config.code).to_string())
            .await
    }

    async fn send_line(&self, line: String) -> Result<(), CoreError> {
        if self.connection_state() != ConnectionState::Connected {
            return Err(CoreError::NotConnected);
        }
        self.inner
            .outbound_tx
            .send(line)
            .await
            .map_err(|_| CoreError::NotConnected)
    }
}

// ── Shared state updates ─────────────────────────────────────────

impl<C: Connector> KeypadInner<C> {
    fn set_state(&self, next: ConnectionState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            debug!(from = %prev, to = %next, "connection state");
            let _ = self.event_tx.send(KeypadEvent::Connection(next));
        }
    }

    /// Route one inbound line through the codec.
    fn ingest(&self, line: &str, tracker: &mut ModeTracker) {
        match parse_line(line) {
            Ok(None) => {}
            Ok(Some(Message::State(state))) => {
                let state = Arc::new(state);
                let transition = tracker.observe(Some(&state));
                self.snapshot.send_replace(Some(state));

                if let Some(transition) = transition {
                    info!(from = %transition.from, to = %transition.to, "display mode changed");
                    self.mode.send_replace(transition.to);
                    let _ = self.event_tx.send(KeypadEvent::ModeChanged(transition));
                }
            }
            Ok(Some(Message::Control(control))) => match control.verb {
                ControlVerb::Pong => debug!(mask = %control.payload, "PONG received, device is alive"),
                _ => debug!(line, "ignoring control line"),
            },
            Err(e @ ProtocolError::MalformedSnapshot { .. }) => {
                warn!(error = %e, "dropping malformed snapshot, keeping last good state");
            }
            Err(e @ ProtocolError::Unrecognized(_)) => {
                debug!(error = %e, "dropping unrecognized line");
            }
        }
    }
}

// ── Background session loop ──────────────────────────────────────

enum SessionEnd {
    /// Peer closed the transport.
    Closed,
    /// Transport error; we force the close.
    Failed(ad2kp_api::Error),
    /// Local shutdown.
    Shutdown,
}

/// connect → run → close → fixed delay → connect ... until shutdown.
async fn session_loop<C: Connector>(inner: Arc<KeypadInner<C>>, mut outbound: mpsc::Receiver<String>) {
    let endpoint = inner.connector.endpoint();
    let mut tracker = ModeTracker::new();

    loop {
        inner.set_state(ConnectionState::Connecting);
        info!(%endpoint, "connecting");

        let opened = tokio::select! {
            biased;
            () = inner.cancel.cancelled() => None,
            result = inner.connector.connect() => Some(result),
        };

        match opened {
            None => {}
            Some(Ok(mut transport)) => {
                let end = run_connected(&inner, &mut transport, &mut outbound, &mut tracker).await;
                match end {
                    SessionEnd::Closed => info!(%endpoint, "transport closed by peer"),
                    SessionEnd::Failed(ref e) => warn!(%endpoint, error = %e, "transport error, closing"),
                    SessionEnd::Shutdown => debug!(%endpoint, "closing transport for shutdown"),
                }

                if !matches!(end, SessionEnd::Closed) {
                    inner.set_state(ConnectionState::Closing);
                    match tokio::time::timeout(CLOSE_TIMEOUT, transport.close()).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => debug!(error = %e, "error while closing transport"),
                        Err(_) => debug!("transport close timed out"),
                    }
                }
            }
            Some(Err(e)) => warn!(%endpoint, error = %e, "connection attempt failed"),
        }

        inner.set_state(ConnectionState::Disconnected);

        if inner.cancel.is_cancelled() {
            break;
        }

        let delay = inner.config.reconnect_delay;
        info!(delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX), "reconnecting after delay");

        tokio::select! {
            biased;
            () = inner.cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }
    }

    debug!("keypad session loop exiting");
}

/// Drive one open transport until it closes, fails, or we shut down.
///
/// The heartbeat interval lives on this stack frame, so it cannot outlive
/// the transport it pings.
async fn run_connected<C: Connector>(
    inner: &KeypadInner<C>,
    transport: &mut LineTransport,
    outbound: &mut mpsc::Receiver<String>,
    tracker: &mut ModeTracker,
) -> SessionEnd {
    // Lines queued against a previous transport are stale.
    let mut stale = 0usize;
    while outbound.try_recv().is_ok() {
        stale += 1;
    }
    if stale > 0 {
        debug!(stale, "dropped commands queued before this connection");
    }

    // Published only after the drain, so anything accepted from here on is
    // sent on this transport.
    inner.set_state(ConnectionState::Connected);
    info!(endpoint = %inner.connector.endpoint(), "transport open");

    let config = &inner.config;
    let sync = ControlLine::sync(config.partition, config.code).to_string();
    debug!(partition = config.partition, code = config.code, "sending SYNC");
    if let Err(e) = transport.send_line(sync).await {
        return SessionEnd::Failed(e);
    }

    let period = config.heartbeat_interval;
    let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = inner.cancel.cancelled() => {
                // Commands accepted before shutdown still go out.
                while let Ok(line) = outbound.try_recv() {
                    if let Err(e) = transport.send_line(line).await {
                        return SessionEnd::Failed(e);
                    }
                }
                return SessionEnd::Shutdown;
            }
            line = transport.next_line() => match line {
                Some(Ok(line)) => inner.ingest(&line, tracker),
                Some(Err(e)) => return SessionEnd::Failed(e),
                None => return SessionEnd::Closed,
            },
            Some(line) = outbound.recv() => {
                debug!(%line, "sending");
                if let Err(e) = transport.send_line(line).await {
                    return SessionEnd::Failed(e);
                }
            }
            _ = heartbeat.tick() => {
                debug!("sending PING");
                if let Err(e) = transport.send_line(ControlLine::ping(&config.ping_mask).to_string()).await {
                    return SessionEnd::Failed(e);
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use futures_util::SinkExt;
    use pretty_assertions::assert_eq;
    use tokio::time::timeout;
    use tokio_stream::wrappers::ReceiverStream;
    use tokio_util::sync::PollSender;

    use super::*;

    // ── In-memory transport ──────────────────────────────────────

    /// Device side of one mock connection.
    struct MockPeer {
        to_client: mpsc::Sender<Result<String, ad2kp_api::Error>>,
        from_client: mpsc::Receiver<String>,
    }

    impl MockPeer {
        async fn push(&self, line: &str) {
            self.to_client.send(Ok(line.to_owned())).await.unwrap();
        }

        async fn fail(&self) {
            let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
            self.to_client.send(Err(err.into())).await.unwrap();
        }

        async fn recv(&mut self) -> String {
            timeout(Duration::from_secs(120), self.from_client.recv())
                .await
                .unwrap()
                .unwrap()
        }
    }

    #[derive(Clone)]
    struct MockConnector {
        attempts: Arc<AtomicUsize>,
        refuse: Arc<AtomicBool>,
        peers: mpsc::UnboundedSender<MockPeer>,
    }

    impl Connector for MockConnector {
        fn endpoint(&self) -> String {
            "mock://keypad".into()
        }

        async fn connect(&self) -> Result<LineTransport, ad2kp_api::Error> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.refuse.load(Ordering::SeqCst) {
                return Err(ad2kp_api::Error::Connect {
                    endpoint: self.endpoint(),
                    reason: "connection refused".into(),
                });
            }

            let (to_client, client_rx) = mpsc::channel(16);
            let (client_tx, from_client) = mpsc::channel(16);
            let _ = self.peers.send(MockPeer { to_client, from_client });

            Ok(LineTransport::new(
                PollSender::new(client_tx).sink_map_err(|_| ad2kp_api::Error::Closed),
                ReceiverStream::new(client_rx),
            ))
        }
    }

    struct Harness {
        keypad: Keypad<MockConnector>,
        events: broadcast::Receiver<KeypadEvent>,
        peers: mpsc::UnboundedReceiver<MockPeer>,
        attempts: Arc<AtomicUsize>,
        refuse: Arc<AtomicBool>,
    }

    impl Harness {
        fn new(config: KeypadConfig) -> Self {
            let (peers_tx, peers) = mpsc::unbounded_channel();
            let connector = MockConnector {
                attempts: Arc::new(AtomicUsize::new(0)),
                refuse: Arc::new(AtomicBool::new(false)),
                peers: peers_tx,
            };
            let attempts = Arc::clone(&connector.attempts);
            let refuse = Arc::clone(&connector.refuse);
            let keypad = Keypad::new(config, connector);
            let events = keypad.subscribe();
            Self { keypad, events, peers, attempts, refuse }
        }

        async fn next_peer(&mut self) -> MockPeer {
            timeout(Duration::from_secs(120), self.peers.recv())
                .await
                .unwrap()
                .unwrap()
        }

        async fn next_event(&mut self) -> KeypadEvent {
            timeout(Duration::from_secs(120), self.events.recv())
                .await
                .unwrap()
                .unwrap()
        }

        async fn wait_for_state(&mut self, state: ConnectionState) {
            while self.next_event().await != KeypadEvent::Connection(state) {}
        }

        /// Drain events until none arrive for a virtual second.
        async fn drain_events(&mut self) -> Vec<KeypadEvent> {
            let mut events = Vec::new();
            while let Ok(Ok(event)) = timeout(Duration::from_secs(1), self.events.recv()).await {
                events.push(event);
            }
            events
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    fn snapshot(json: serde_json::Value) -> String {
        json.to_string()
    }

    // ── Handshake & heartbeat ────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn sync_is_first_line_after_open() {
        let mut h = Harness::new(KeypadConfig {
            partition: 2,
            code: 5,
            ..KeypadConfig::default()
        });
        h.keypad.connect().await.unwrap();

        let mut peer = h.next_peer().await;
        assert_eq!(peer.recv().await, "!SYNC:2,5");

        assert_eq!(h.next_event().await, KeypadEvent::Connection(ConnectionState::Connecting));
        assert_eq!(h.next_event().await, KeypadEvent::Connection(ConnectionState::Connected));
        assert_eq!(h.keypad.connection_state(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_every_interval_while_connected() {
        let mut h = Harness::new(KeypadConfig::default());
        h.keypad.connect().await.unwrap();

        let mut peer = h.next_peer().await;
        peer.recv().await;
        let opened = Instant::now();

        assert_eq!(peer.recv().await, "!PING:00000000");
        assert_eq!(opened.elapsed(), Duration::from_secs(15));

        assert_eq!(peer.recv().await, "!PING:00000000");
        assert_eq!(opened.elapsed(), Duration::from_secs(30));
    }

    // ── Mode notifications ───────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn mode_change_notified_once_per_transition() {
        let mut h = Harness::new(KeypadConfig::default());
        h.keypad.connect().await.unwrap();
        let mut peer = h.next_peer().await;
        peer.recv().await;
        h.wait_for_state(ConnectionState::Connected).await;

        let ready = snapshot(serde_json::json!({ "ready": true }));
        let not_ready = snapshot(serde_json::json!({ "last_alpha_message": "FAULT 05" }));
        for line in [&ready, &ready, &not_ready, &not_ready, &ready] {
            peer.push(line).await;
        }

        let transitions: Vec<_> = h
            .drain_events()
            .await
            .into_iter()
            .filter_map(|e| match e {
                KeypadEvent::ModeChanged(t) => Some((t.from, t.to)),
                KeypadEvent::Connection(_) => None,
            })
            .collect();

        assert_eq!(
            transitions,
            vec![
                (DisplayMode::Unknown, DisplayMode::Ready),
                (DisplayMode::Ready, DisplayMode::NotReady),
                (DisplayMode::NotReady, DisplayMode::Ready),
            ]
        );
        assert_eq!(h.keypad.mode(), DisplayMode::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_snapshot_keeps_last_good_state() {
        let mut h = Harness::new(KeypadConfig::default());
        h.keypad.connect().await.unwrap();
        let mut peer = h.next_peer().await;
        peer.recv().await;

        peer.push(&snapshot(serde_json::json!({ "armed_away": true }))).await;
        peer.push(r#"{"ready": tru"#).await;
        peer.push("!LRR:008,1,CID_1406,ff").await;
        peer.push("[00110001000000003A--],008,[f70000051008000000],\"FAULT\"").await;
        h.drain_events().await;

        assert_eq!(h.keypad.mode(), DisplayMode::ArmedAway);
        assert!(h.keypad.snapshot().unwrap().armed_away);
        assert_eq!(h.keypad.connection_state(), ConnectionState::Connected);
    }

    /// Hands out one end of an in-memory byte stream, framed like TCP.
    struct DuplexConnector(std::sync::Mutex<Option<tokio::io::DuplexStream>>);

    impl Connector for DuplexConnector {
        fn endpoint(&self) -> String {
            "duplex://keypad".into()
        }

        async fn connect(&self) -> Result<LineTransport, ad2kp_api::Error> {
            let io = self.0.lock().unwrap().take().ok_or(ad2kp_api::Error::Closed)?;
            Ok(ad2kp_api::transport::framed_lines(io))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_line_is_dropped_without_reconnect() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let (client, mut device) = tokio::io::duplex(64 * 1024);
        let keypad = Keypad::new(
            KeypadConfig::default(),
            DuplexConnector(std::sync::Mutex::new(Some(client))),
        );
        let mut events = keypad.subscribe();
        keypad.connect().await.unwrap();

        let mut sync = [0u8; 10];
        device.read_exact(&mut sync).await.unwrap();
        assert_eq!(&sync, b"!SYNC:0,0\n");

        let oversized = format!("{{\"last_alpha_message\":\"{}\"}}\n", "x".repeat(9000));
        device.write_all(b"{\"ready\":true}\n").await.unwrap();
        device.write_all(oversized.as_bytes()).await.unwrap();
        device.write_all(b"{\"armed_away\":true}\n").await.unwrap();

        let mut seen = Vec::new();
        loop {
            let event = timeout(Duration::from_secs(5), events.recv()).await.unwrap().unwrap();
            seen.push(event.clone());
            if matches!(&event, KeypadEvent::ModeChanged(t) if t.to == DisplayMode::ArmedAway) {
                break;
            }
        }

        assert!(
            !seen.iter().any(|e| matches!(
                e,
                KeypadEvent::Connection(ConnectionState::Closing | ConnectionState::Disconnected)
            )),
            "connection dropped: {seen:?}"
        );
        assert_eq!(keypad.connection_state(), ConnectionState::Connected);
        keypad.shutdown().await;
    }

    // ── Reconnect ────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn peer_close_schedules_one_reconnect_after_delay() {
        let mut h = Harness::new(KeypadConfig::default());
        h.keypad.connect().await.unwrap();
        let mut peer = h.next_peer().await;
        peer.recv().await;
        h.wait_for_state(ConnectionState::Connected).await;

        drop(peer);
        assert_eq!(h.next_event().await, KeypadEvent::Connection(ConnectionState::Disconnected));
        let closed = Instant::now();

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(h.attempts(), 1);

        let mut peer = h.next_peer().await;
        assert_eq!(closed.elapsed(), Duration::from_secs(1));
        assert_eq!(h.attempts(), 2);

        // Nothing was sent between close and reopen; SYNC comes first.
        assert_eq!(peer.recv().await, "!SYNC:0,0");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_attempts_retry_forever_at_fixed_delay() {
        let mut h = Harness::new(KeypadConfig::default());
        h.refuse.store(true, Ordering::SeqCst);
        h.keypad.connect().await.unwrap();

        tokio::time::sleep(Duration::from_millis(5500)).await;
        assert_eq!(h.attempts(), 6);

        let mut events = Vec::new();
        while let Ok(event) = h.events.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 12);
        assert!(events.iter().all(|e| matches!(
            e,
            KeypadEvent::Connection(ConnectionState::Connecting | ConnectionState::Disconnected)
        )));

        h.refuse.store(false, Ordering::SeqCst);
        let mut peer = h.next_peer().await;
        assert_eq!(peer.recv().await, "!SYNC:0,0");
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_passes_through_closing() {
        let mut h = Harness::new(KeypadConfig::default());
        h.keypad.connect().await.unwrap();
        let mut peer = h.next_peer().await;
        peer.recv().await;
        h.wait_for_state(ConnectionState::Connected).await;

        peer.fail().await;

        assert_eq!(h.next_event().await, KeypadEvent::Connection(ConnectionState::Closing));
        assert_eq!(h.next_event().await, KeypadEvent::Connection(ConnectionState::Disconnected));
        assert_eq!(h.next_event().await, KeypadEvent::Connection(ConnectionState::Connecting));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_reconnect() {
        let h = Harness::new(KeypadConfig::default());
        h.refuse.store(true, Ordering::SeqCst);
        h.keypad.connect().await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(h.attempts(), 1);

        h.keypad.shutdown().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(h.attempts(), 1);
        assert_eq!(h.keypad.connection_state(), ConnectionState::Disconnected);
        assert!(matches!(h.keypad.connect().await, Err(CoreError::ShutDown)));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_while_connected_closes_transport() {
        let mut h = Harness::new(KeypadConfig::default());
        h.keypad.connect().await.unwrap();
        let mut peer = h.next_peer().await;
        peer.recv().await;
        h.wait_for_state(ConnectionState::Connected).await;

        h.keypad.shutdown().await;

        assert_eq!(h.next_event().await, KeypadEvent::Connection(ConnectionState::Closing));
        assert_eq!(h.next_event().await, KeypadEvent::Connection(ConnectionState::Disconnected));
        assert!(timeout(Duration::from_secs(30), peer.from_client.recv()).await.unwrap().is_none());
        assert_eq!(h.attempts(), 1);
    }

    // ── Commands ─────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn queued_command_is_flushed_on_shutdown() {
        let mut h = Harness::new(KeypadConfig::default());
        h.keypad.connect().await.unwrap();
        let mut peer = h.next_peer().await;
        peer.recv().await;
        h.wait_for_state(ConnectionState::Connected).await;

        h.keypad.send(KeypadCommand::Disarm).await.unwrap();
        h.keypad.shutdown().await;

        assert_eq!(peer.recv().await, "!SEND:<DISARM>");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn command_sent_once_connected_is_delivered() {
        for _ in 0..50 {
            let mut h = Harness::new(KeypadConfig::default());
            let mut state = h.keypad.watch_state();
            h.keypad.connect().await.unwrap();

            state.wait_for(|s| *s == ConnectionState::Connected).await.unwrap();
            h.keypad.send(KeypadCommand::Disarm).await.unwrap();

            let mut peer = h.next_peer().await;
            assert_eq!(peer.recv().await, "!SYNC:0,0");
            assert_eq!(peer.recv().await, "!SEND:<DISARM>");
            h.keypad.shutdown().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn send_command_requires_connection() {
        let h = Harness::new(KeypadConfig::default());

        assert!(matches!(
            h.keypad.send_command("<DISARM>").await,
            Err(CoreError::NotConnected)
        ));
        // Empty is a no-op even while disconnected.
        h.keypad.send_command("").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn commands_and_resync_are_forwarded_verbatim() {
        let mut h = Harness::new(KeypadConfig {
            partition: 1,
            code: 3,
            ..KeypadConfig::default()
        });
        h.keypad.connect().await.unwrap();
        let mut peer = h.next_peer().await;
        assert_eq!(peer.recv().await, "!SYNC:1,3");
        h.wait_for_state(ConnectionState::Connected).await;

        h.keypad.send_command("<AWAY>").await.unwrap();
        h.keypad.send(KeypadCommand::Bypass(4)).await.unwrap();
        h.keypad.send_command("anything goes").await.unwrap();
        h.keypad.request_sync().await.unwrap();

        assert_eq!(peer.recv().await, "!SEND:<AWAY>");
        assert_eq!(peer.recv().await, "!SEND:<BYPASS>04");
        assert_eq!(peer.recv().await, "!SEND:anything goes");
        assert_eq!(peer.recv().await, "!SYNC:1,3");
    }

    #[tokio::test(start_paused = true)]
    async fn connect_twice_is_noop() {
        let mut h = Harness::new(KeypadConfig::default());
        h.keypad.connect().await.unwrap();
        h.keypad.connect().await.unwrap();

        let mut peer = h.next_peer().await;
        peer.recv().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(h.attempts(), 1);
    }
}
