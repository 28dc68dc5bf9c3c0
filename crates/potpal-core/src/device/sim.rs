// ── Simulated radio adapter ──
//
// In-process stand-in for the platform radio: powers on shortly after
// creation, emits scripted discoveries while a scan is active, and
// resolves connects after a fixed delay. Lets the CLI walk the whole
// pairing flow without pot hardware.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::device::adapter::{AdapterEvent, AdapterState, RadioAdapter};
use crate::model::PotId;

const POWER_ON_DELAY: Duration = Duration::from_millis(50);
const DISCOVERY_SPACING: Duration = Duration::from_millis(150);
const CONNECT_DELAY: Duration = Duration::from_millis(300);

/// One scripted pot the simulated radio can discover.
#[derive(Debug, Clone)]
pub struct SimulatedPot {
    pub id: PotId,
    pub name: String,
    pub rssi: i16,
    /// Unreachable pots are discovered but refuse connections.
    pub reachable: bool,
}

impl SimulatedPot {
    pub fn reachable(id: &str, name: &str, rssi: i16) -> Self {
        Self {
            id: PotId::from(id),
            name: name.to_owned(),
            rssi,
            reachable: true,
        }
    }

    pub fn unreachable(id: &str, name: &str, rssi: i16) -> Self {
        Self {
            id: PotId::from(id),
            name: name.to_owned(),
            rssi,
            reachable: false,
        }
    }
}

/// Scripted [`RadioAdapter`] implementation.
pub struct SimulatedRadio {
    events: mpsc::Sender<AdapterEvent>,
    pots: Arc<Vec<SimulatedPot>>,
    scanning: Arc<AtomicBool>,
}

impl SimulatedRadio {
    /// Build a radio over a scripted pot list. Returns the adapter and
    /// the event channel to hand to [`DeviceLink`](crate::DeviceLink).
    ///
    /// The adapter reports `PoweredOn` shortly after creation.
    pub fn new(pots: Vec<SimulatedPot>) -> (Self, mpsc::Receiver<AdapterEvent>) {
        let (tx, rx) = mpsc::channel(32);

        let power_tx = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(POWER_ON_DELAY).await;
            let _ = power_tx
                .send(AdapterEvent::StateChanged(AdapterState::PoweredOn))
                .await;
        });

        (
            Self {
                events: tx,
                pots: Arc::new(pots),
                scanning: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }

    /// The demo pot set the CLI scans by default.
    pub fn demo_pots() -> Vec<SimulatedPot> {
        vec![
            SimulatedPot::reachable("C4:D8:11:02:AA:01", "PotPal Mini", -52),
            SimulatedPot::reachable("C4:D8:11:02:AA:02", "PotPal Duo", -67),
            SimulatedPot::unreachable("C4:D8:11:02:AA:03", "PotPal Classic", -81),
        ]
    }
}

impl RadioAdapter for SimulatedRadio {
    fn start_scan(&self) {
        self.scanning.store(true, Ordering::SeqCst);

        let events = self.events.clone();
        let pots = Arc::clone(&self.pots);
        let scanning = Arc::clone(&self.scanning);

        tokio::spawn(async move {
            for (i, pot) in pots.iter().enumerate() {
                tokio::time::sleep(DISCOVERY_SPACING * (i as u32 + 1)).await;
                if !scanning.load(Ordering::SeqCst) {
                    break;
                }
                let _ = events
                    .send(AdapterEvent::DeviceDiscovered {
                        id: pot.id.clone(),
                        name: Some(pot.name.clone()),
                        rssi: pot.rssi,
                    })
                    .await;
            }
        });
    }

    fn stop_scan(&self) {
        self.scanning.store(false, Ordering::SeqCst);
    }

    fn connect(&self, id: &PotId) {
        let events = self.events.clone();
        let id = id.clone();
        let reachable = self
            .pots
            .iter()
            .find(|p| p.id == id)
            .is_some_and(|p| p.reachable);

        tokio::spawn(async move {
            tokio::time::sleep(CONNECT_DELAY).await;
            let event = if reachable {
                AdapterEvent::Connected { id }
            } else {
                AdapterEvent::ConnectFailed {
                    id,
                    reason: "pot did not respond".into(),
                }
            };
            let _ = events.send(event).await;
        });
    }

    fn cancel_connection(&self, id: &PotId) {
        let events = self.events.clone();
        let id = id.clone();

        tokio::spawn(async move {
            let _ = events
                .send(AdapterEvent::Disconnected { id, error: None })
                .await;
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::device::link::{DeviceLink, LinkState};

    async fn wait_for<T: Clone + Send + Sync + 'static>(
        rx: &mut tokio::sync::watch::Receiver<T>,
        pred: impl Fn(&T) -> bool,
    ) -> T {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|v| pred(v)))
            .await
            .expect("state within deadline")
            .expect("watch alive")
            .clone()
    }

    #[tokio::test]
    async fn full_pairing_flow_against_simulated_radio() {
        let (radio, events) = SimulatedRadio::new(SimulatedRadio::demo_pots());
        let link = DeviceLink::new(radio, events);

        let mut adapter_rx = link.adapter_state();
        wait_for(&mut adapter_rx, |s| *s == AdapterState::PoweredOn).await;

        link.start_scan().unwrap();
        let mut discovered_rx = link.discovered();
        wait_for(&mut discovered_rx, |pots| pots.len() >= 2).await;

        let target = link.discovered_snapshot()[0].id.clone();
        link.connect(&target).unwrap();

        let mut state_rx = link.link_state();
        wait_for(&mut state_rx, |s| *s == LinkState::Connected).await;
        assert_eq!(link.connected_pot(), Some(target));
    }

    #[tokio::test]
    async fn unreachable_pot_fails_to_connect() {
        let pots = vec![SimulatedPot::unreachable("AA:01", "Dead Pot", -90)];
        let (radio, events) = SimulatedRadio::new(pots);
        let link = DeviceLink::new(radio, events);

        let mut adapter_rx = link.adapter_state();
        wait_for(&mut adapter_rx, |s| *s == AdapterState::PoweredOn).await;

        link.connect(&PotId::from("AA:01")).unwrap();

        let mut state_rx = link.link_state();
        wait_for(&mut state_rx, |s| *s == LinkState::Failed).await;
        assert!(link.last_error().is_some());
    }
}
