// ── Radio link state machine ──
//
// Folds adapter events into observable link state. Transitions are driven
// exclusively by adapter callbacks and connection-attempt outcomes; the
// caller only ever invokes start_scan / stop_scan / connect / disconnect.

use std::sync::{Arc, Mutex};

use strum::Display;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::device::adapter::{AdapterEvent, AdapterState, RadioAdapter};
use crate::error::DeviceError;
use crate::model::{DiscoveredPot, PotId};

// ── LinkState ───────────────────────────────────────────────────────

/// Connection state of the radio link. Exactly one value at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LinkState {
    Disconnected,
    Scanning,
    Connecting,
    Connected,
    Disconnecting,
    Failed,
}

// ── DeviceLink ──────────────────────────────────────────────────────

/// Best-effort link to a smart pot over the short-range radio.
///
/// Owns the discovery list and connection state; at most one connection
/// is active or pending at a time -- a second `connect` is rejected until
/// the first is torn down. All mutation funnels through one event pump
/// plus the four caller operations, serialized by the state mutex.
pub struct DeviceLink<A: RadioAdapter> {
    inner: Arc<LinkInner<A>>,
}

impl<A: RadioAdapter> Clone for DeviceLink<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct LinkInner<A> {
    adapter: A,
    core: Mutex<LinkCore>,
    adapter_state: watch::Sender<AdapterState>,
    link_state: watch::Sender<LinkState>,
    discovered: watch::Sender<Arc<Vec<DiscoveredPot>>>,
    connected: watch::Sender<Option<PotId>>,
    status: watch::Sender<String>,
    last_error: watch::Sender<Option<String>>,
    cancel: CancellationToken,
}

/// Authoritative link state, guarded by one mutex.
struct LinkCore {
    adapter: AdapterState,
    link: LinkState,
    discovered: Vec<DiscoveredPot>,
    connected: Option<PotId>,
    pending: Option<PotId>,
}

impl<A: RadioAdapter> DeviceLink<A> {
    /// Wrap an adapter and start pumping its event channel.
    pub fn new(adapter: A, events: mpsc::Receiver<AdapterEvent>) -> Self {
        let (adapter_state, _) = watch::channel(AdapterState::Unknown);
        let (link_state, _) = watch::channel(LinkState::Disconnected);
        let (discovered, _) = watch::channel(Arc::new(Vec::new()));
        let (connected, _) = watch::channel(None);
        let (status, _) = watch::channel("Disconnected".to_owned());
        let (last_error, _) = watch::channel(None);
        let cancel = CancellationToken::new();

        let link = Self {
            inner: Arc::new(LinkInner {
                adapter,
                core: Mutex::new(LinkCore {
                    adapter: AdapterState::Unknown,
                    link: LinkState::Disconnected,
                    discovered: Vec::new(),
                    connected: None,
                    pending: None,
                }),
                adapter_state,
                link_state,
                discovered,
                connected,
                status,
                last_error,
                cancel,
            }),
        };

        link.spawn_pump(events);
        link
    }

    fn spawn_pump(&self, mut events: mpsc::Receiver<AdapterEvent>) {
        let inner = Arc::clone(&self.inner);
        let cancel = inner.cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    event = events.recv() => {
                        let Some(event) = event else { break };
                        inner.handle_event(event);
                    }
                }
            }
            debug!("device link event pump stopped");
        });
    }

    // ── Caller operations ────────────────────────────────────────────

    /// Begin discovery. Clears the previous discovery list.
    ///
    /// Rejected unless the adapter is powered on.
    pub fn start_scan(&self) -> Result<(), DeviceError> {
        let inner = &self.inner;
        let mut core = inner.lock();

        inner.check_powered(&core)?;
        core.discovered.clear();
        core.link = LinkState::Scanning;
        inner.adapter.start_scan();
        inner.publish(&core, "Scanning...");
        Ok(())
    }

    /// Stop discovery. The discovery list is kept until the next scan.
    pub fn stop_scan(&self) {
        let inner = &self.inner;
        let mut core = inner.lock();

        inner.adapter.stop_scan();
        if core.link == LinkState::Scanning {
            core.link = if core.connected.is_some() {
                LinkState::Connected
            } else {
                LinkState::Disconnected
            };
            inner.publish(&core, "Scan stopped");
        }
    }

    /// Request a connection to a discovered pot.
    ///
    /// Rejected (no state change) when the adapter is not powered on or a
    /// connection is already active or pending. Scanning stops first.
    pub fn connect(&self, id: &PotId) -> Result<(), DeviceError> {
        let inner = &self.inner;
        let mut core = inner.lock();

        inner.check_powered(&core)?;
        if let Some(existing) = core.connected.as_ref().or(core.pending.as_ref()) {
            return Err(DeviceError::AlreadyConnected(existing.clone()));
        }

        if core.link == LinkState::Scanning {
            inner.adapter.stop_scan();
        }

        core.pending = Some(id.clone());
        core.link = LinkState::Connecting;
        inner.adapter.connect(id);
        inner.publish(&core, "Connecting...");
        Ok(())
    }

    /// Tear down the active or pending connection.
    pub fn disconnect(&self) -> Result<(), DeviceError> {
        let inner = &self.inner;
        let mut core = inner.lock();

        let id = core
            .connected
            .clone()
            .or_else(|| core.pending.clone())
            .ok_or(DeviceError::NotConnected)?;

        core.link = LinkState::Disconnecting;
        inner.adapter.cancel_connection(&id);
        inner.publish(&core, "Disconnecting...");
        Ok(())
    }

    /// Stop the event pump. Further adapter events are ignored.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    // ── State observation ────────────────────────────────────────────

    pub fn adapter_state(&self) -> watch::Receiver<AdapterState> {
        self.inner.adapter_state.subscribe()
    }

    pub fn link_state(&self) -> watch::Receiver<LinkState> {
        self.inner.link_state.subscribe()
    }

    /// Subscribe to the discovery list.
    pub fn discovered(&self) -> watch::Receiver<Arc<Vec<DiscoveredPot>>> {
        self.inner.discovered.subscribe()
    }

    /// The current discovery list.
    pub fn discovered_snapshot(&self) -> Arc<Vec<DiscoveredPot>> {
        self.inner.discovered.borrow().clone()
    }

    pub fn connected_pot(&self) -> Option<PotId> {
        self.inner.connected.borrow().clone()
    }

    /// Human-readable status line.
    pub fn status(&self) -> watch::Receiver<String> {
        self.inner.status.subscribe()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.borrow().clone()
    }
}

impl<A: RadioAdapter> LinkInner<A> {
    fn lock(&self) -> std::sync::MutexGuard<'_, LinkCore> {
        self.core.lock().expect("link state lock poisoned")
    }

    fn check_powered(&self, core: &LinkCore) -> Result<(), DeviceError> {
        match core.adapter {
            AdapterState::PoweredOn => Ok(()),
            AdapterState::Unauthorized => Err(DeviceError::Unauthorized),
            AdapterState::Unsupported => Err(DeviceError::Unsupported),
            state => Err(DeviceError::AdapterUnavailable(state)),
        }
    }

    /// Fold one adapter event into the state.
    fn handle_event(&self, event: AdapterEvent) {
        let mut core = self.lock();

        match event {
            AdapterEvent::StateChanged(state) => {
                debug!(%state, "adapter state changed");
                core.adapter = state;

                if state == AdapterState::PoweredOn {
                    self.publish(&core, "Ready to scan");
                    return;
                }

                // Anything but powered-on is an unconditional reset: stop
                // scanning, drop discoveries, forget the connection.
                if core.link == LinkState::Scanning {
                    self.adapter.stop_scan();
                }
                core.discovered.clear();
                core.connected = None;
                core.pending = None;
                core.link = LinkState::Disconnected;

                let status = match state {
                    AdapterState::PoweredOff => "Radio off",
                    AdapterState::Unauthorized => {
                        self.set_error("Radio permissions denied");
                        "Unauthorized"
                    }
                    AdapterState::Unsupported => "Radio unsupported",
                    _ => "Radio unavailable",
                };
                self.publish(&core, status);
            }

            AdapterEvent::DeviceDiscovered { id, name, rssi } => {
                // The discovery list never holds two entries with the same
                // id: repeats update name and signal strength in place.
                match core.discovered.iter_mut().find(|p| p.id == id) {
                    Some(existing) => {
                        existing.name = name;
                        existing.rssi = rssi;
                    }
                    None => {
                        debug!(%id, "pot discovered");
                        core.discovered.push(DiscoveredPot { id, name, rssi });
                    }
                }
                let status = self.status.borrow().clone();
                self.publish(&core, &status);
            }

            AdapterEvent::Connected { id } => {
                debug!(%id, "pot connected");
                let label = core
                    .discovered
                    .iter()
                    .find(|p| p.id == id)
                    .map_or_else(|| id.to_string(), |p| p.label().to_owned());
                core.connected = Some(id);
                core.pending = None;
                core.link = LinkState::Connected;
                self.publish(&core, &format!("Connected to {label}"));
            }

            AdapterEvent::ConnectFailed { id, reason } => {
                warn!(%id, reason, "connect failed");
                core.pending = None;
                core.link = LinkState::Failed;
                self.set_error(&reason);
                self.publish(&core, "Connection failed");
            }

            AdapterEvent::Disconnected { id, error } => {
                debug!(%id, "pot disconnected");
                core.connected = None;
                core.pending = None;
                core.link = LinkState::Disconnected;
                if let Some(error) = error {
                    self.set_error(&format!("Disconnected with error: {error}"));
                }
                self.publish(&core, "Disconnected");
            }
        }
    }

    fn set_error(&self, message: &str) {
        self.last_error.send_replace(Some(message.to_owned()));
    }

    /// Push the authoritative state out through the watch channels.
    fn publish(&self, core: &LinkCore, status: &str) {
        self.adapter_state.send_if_modified(|s| {
            if *s == core.adapter {
                false
            } else {
                *s = core.adapter;
                true
            }
        });
        self.link_state.send_if_modified(|s| {
            if *s == core.link {
                false
            } else {
                *s = core.link;
                true
            }
        });
        self.discovered
            .send_replace(Arc::new(core.discovered.clone()));
        self.connected.send_replace(core.connected.clone());
        self.status.send_replace(status.to_owned());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Adapter that records commands; the test drives the event channel.
    #[derive(Default)]
    struct RecordingAdapter {
        commands: Arc<StdMutex<Vec<String>>>,
    }

    impl RadioAdapter for RecordingAdapter {
        fn start_scan(&self) {
            self.commands.lock().unwrap().push("start_scan".into());
        }
        fn stop_scan(&self) {
            self.commands.lock().unwrap().push("stop_scan".into());
        }
        fn connect(&self, id: &PotId) {
            self.commands.lock().unwrap().push(format!("connect {id}"));
        }
        fn cancel_connection(&self, id: &PotId) {
            self.commands.lock().unwrap().push(format!("cancel {id}"));
        }
    }

    struct Harness {
        link: DeviceLink<RecordingAdapter>,
        events: mpsc::Sender<AdapterEvent>,
        log: Arc<StdMutex<Vec<String>>>,
    }

    fn harness() -> Harness {
        let adapter = RecordingAdapter::default();
        let log = Arc::clone(&adapter.commands);
        let (tx, rx) = mpsc::channel(16);
        Harness {
            link: DeviceLink::new(adapter, rx),
            events: tx,
            log,
        }
    }

    async fn drive(h: &Harness, event: AdapterEvent) {
        h.events.send(event).await.unwrap();
        // Let the pump fold the event before the test observes state.
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    async fn power_on(h: &Harness) {
        drive(h, AdapterEvent::StateChanged(AdapterState::PoweredOn)).await;
    }

    fn pot(id: &str, rssi: i16) -> AdapterEvent {
        AdapterEvent::DeviceDiscovered {
            id: PotId::from(id),
            name: Some(format!("Pot {id}")),
            rssi,
        }
    }

    #[tokio::test]
    async fn connect_rejected_until_powered_on() {
        let h = harness();

        let err = h.link.connect(&PotId::from("p1")).unwrap_err();
        assert!(matches!(err, DeviceError::AdapterUnavailable(AdapterState::Unknown)));

        // Nothing reached the adapter, nothing changed.
        assert!(h.log().is_empty());
        assert_eq!(*h.link.link_state().borrow(), LinkState::Disconnected);
        assert!(h.link.discovered_snapshot().is_empty());
    }

    #[tokio::test]
    async fn scan_rejected_when_powered_off() {
        let h = harness();
        drive(&h, AdapterEvent::StateChanged(AdapterState::PoweredOff)).await;

        let err = h.link.start_scan().unwrap_err();
        assert!(matches!(err, DeviceError::AdapterUnavailable(AdapterState::PoweredOff)));
    }

    #[tokio::test]
    async fn duplicate_discoveries_collapse_to_one_entry() {
        let h = harness();
        power_on(&h).await;
        h.link.start_scan().unwrap();

        drive(&h, pot("p1", -60)).await;
        drive(&h, pot("p1", -48)).await;

        let discovered = h.link.discovered_snapshot();
        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].rssi, -48);
    }

    #[tokio::test]
    async fn connect_stops_scanning_first() {
        let h = harness();
        power_on(&h).await;
        h.link.start_scan().unwrap();
        drive(&h, pot("p1", -60)).await;

        h.link.connect(&PotId::from("p1")).unwrap();

        assert_eq!(
            h.log(),
            vec!["start_scan", "stop_scan", "connect p1"],
            "scan must stop before the connect goes out"
        );
        assert_eq!(*h.link.link_state().borrow(), LinkState::Connecting);
    }

    #[tokio::test]
    async fn second_connect_rejected_while_pending() {
        let h = harness();
        power_on(&h).await;
        h.link.connect(&PotId::from("p1")).unwrap();

        let err = h.link.connect(&PotId::from("p2")).unwrap_err();
        assert!(matches!(err, DeviceError::AlreadyConnected(_)));
    }

    #[tokio::test]
    async fn successful_connect_flow() {
        let h = harness();
        power_on(&h).await;
        h.link.start_scan().unwrap();
        drive(&h, pot("p1", -60)).await;
        h.link.connect(&PotId::from("p1")).unwrap();
        drive(&h, AdapterEvent::Connected { id: PotId::from("p1") }).await;

        assert_eq!(*h.link.link_state().borrow(), LinkState::Connected);
        assert_eq!(h.link.connected_pot(), Some(PotId::from("p1")));
        assert_eq!(*h.link.status().borrow(), "Connected to Pot p1");
    }

    #[tokio::test]
    async fn connect_failure_reports_reason() {
        let h = harness();
        power_on(&h).await;
        h.link.connect(&PotId::from("p1")).unwrap();
        drive(
            &h,
            AdapterEvent::ConnectFailed {
                id: PotId::from("p1"),
                reason: "pot did not respond".into(),
            },
        )
        .await;

        assert_eq!(*h.link.link_state().borrow(), LinkState::Failed);
        assert_eq!(h.link.last_error(), Some("pot did not respond".into()));
        assert!(h.link.connected_pot().is_none());
    }

    #[tokio::test]
    async fn power_off_while_connected_resets_everything() {
        let h = harness();
        power_on(&h).await;
        h.link.start_scan().unwrap();
        drive(&h, pot("p1", -60)).await;
        h.link.connect(&PotId::from("p1")).unwrap();
        drive(&h, AdapterEvent::Connected { id: PotId::from("p1") }).await;

        drive(&h, AdapterEvent::StateChanged(AdapterState::PoweredOff)).await;

        assert_eq!(*h.link.adapter_state().borrow(), AdapterState::PoweredOff);
        assert_eq!(*h.link.link_state().borrow(), LinkState::Disconnected);
        assert!(h.link.connected_pot().is_none());
        assert!(h.link.discovered_snapshot().is_empty());
    }

    #[tokio::test]
    async fn disconnect_with_error_payload_surfaces_it() {
        let h = harness();
        power_on(&h).await;
        h.link.connect(&PotId::from("p1")).unwrap();
        drive(&h, AdapterEvent::Connected { id: PotId::from("p1") }).await;

        drive(
            &h,
            AdapterEvent::Disconnected {
                id: PotId::from("p1"),
                error: Some("link dropped".into()),
            },
        )
        .await;

        assert_eq!(*h.link.link_state().borrow(), LinkState::Disconnected);
        assert_eq!(
            h.link.last_error(),
            Some("Disconnected with error: link dropped".into())
        );
    }

    impl Harness {
        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }
}
