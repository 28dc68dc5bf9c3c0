// ── Simulated Wi-Fi command channel ──
//
// Fixed-latency request/response emulation of the pot's network path.
// There is no real transport: each call validates its input, publishes an
// in-progress status, and schedules exactly one terminal status update
// after a fixed delay. Overlapping calls are not synchronized against
// each other (documented limitation, matching the accessory firmware's
// single-command design).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::debug;

use crate::error::DeviceError;
use crate::model::SensorReading;

const CONNECT_DELAY: Duration = Duration::from_secs(2);
const COMMAND_DELAY: Duration = Duration::from_secs(1);

/// The canned sensor report the simulated pot returns.
fn sample_reading() -> SensorReading {
    SensorReading {
        temperature_c: 22.0,
        humidity_pct: 65.0,
        soil_moisture_pct: 80.0,
        received_at: Utc::now(),
    }
}

/// Best-effort command channel to a pot over Wi-Fi.
///
/// State is watch-published: `status()` is the human-readable line the
/// screen shows, `last_reading()` the most recent sensor report.
#[derive(Clone)]
pub struct PotChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    status: watch::Sender<String>,
    error: watch::Sender<Option<String>>,
    last_reading: watch::Sender<Option<SensorReading>>,
    address: watch::Sender<Option<String>>,
    connected: AtomicBool,
}

impl PotChannel {
    pub fn new() -> Self {
        let (status, _) = watch::channel("Disconnected".to_owned());
        let (error, _) = watch::channel(None);
        let (last_reading, _) = watch::channel(None);
        let (address, _) = watch::channel(None);

        Self {
            inner: Arc::new(ChannelInner {
                status,
                error,
                last_reading,
                address,
                connected: AtomicBool::new(false),
            }),
        }
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Connect to a pot by IP address or hostname.
    ///
    /// The `http://` prefix is added when missing. Publishes
    /// "Connecting..." immediately and the connected status plus the
    /// first sensor report after the fixed delay.
    pub fn connect(&self, address: &str) -> Result<(), DeviceError> {
        let address = address.trim();
        if address.is_empty() {
            self.inner
                .error
                .send_replace(Some("Please enter a pot address.".to_owned()));
            return Err(DeviceError::InvalidAddress {
                reason: "address must not be empty",
            });
        }

        let full = if address.starts_with("http://") {
            address.to_owned()
        } else {
            format!("http://{address}")
        };

        let inner = &self.inner;
        inner.error.send_replace(None);
        inner.status.send_replace("Connecting...".to_owned());
        debug!(address = %full, "pot channel connecting");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(CONNECT_DELAY).await;
            inner.connected.store(true, Ordering::SeqCst);
            inner.address.send_replace(Some(full));
            inner.last_reading.send_replace(Some(sample_reading()));
            inner
                .status
                .send_replace("Connected: you can now pair another pot".to_owned());
        });

        Ok(())
    }

    /// Switch the pot's watering mode.
    ///
    /// After the fixed delay the status line names the new mode
    /// ("automatic" or "manual").
    pub fn send_mode_command(&self, automatic: bool) -> Result<(), DeviceError> {
        if !self.inner.connected.load(Ordering::SeqCst) {
            self.inner
                .error
                .send_replace(Some("Not connected to a pot.".to_owned()));
            return Err(DeviceError::NotConnected);
        }

        self.inner
            .status
            .send_replace("Sending mode command...".to_owned());

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(COMMAND_DELAY).await;
            let mode = if automatic { "automatic" } else { "manual" };
            inner
                .status
                .send_replace(format!("Watering mode set to {mode}"));
        });

        Ok(())
    }

    /// Request a fresh sensor report.
    pub fn fetch_data(&self) -> Result<(), DeviceError> {
        if !self.inner.connected.load(Ordering::SeqCst) {
            self.inner
                .error
                .send_replace(Some("Not connected to a pot.".to_owned()));
            return Err(DeviceError::NotConnected);
        }

        self.inner.status.send_replace("Fetching data...".to_owned());

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(COMMAND_DELAY).await;
            inner.last_reading.send_replace(Some(sample_reading()));
            inner
                .status
                .send_replace("Connected: you can now pair another pot".to_owned());
        });

        Ok(())
    }

    // ── State observation ────────────────────────────────────────────

    pub fn status(&self) -> watch::Receiver<String> {
        self.inner.status.subscribe()
    }

    pub fn current_status(&self) -> String {
        self.inner.status.borrow().clone()
    }

    pub fn last_reading(&self) -> watch::Receiver<Option<SensorReading>> {
        self.inner.last_reading.subscribe()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.error.borrow().clone()
    }

    /// The normalized address of the connected pot, if any.
    pub fn address(&self) -> Option<String> {
        self.inner.address.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }
}

impl Default for PotChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn wait_status(
        rx: &mut watch::Receiver<String>,
        pred: impl Fn(&str) -> bool,
    ) -> String {
        tokio::time::timeout(Duration::from_secs(10), rx.wait_for(|s| pred(s)))
            .await
            .expect("status within deadline")
            .expect("channel alive")
            .clone()
    }

    #[tokio::test(start_paused = true)]
    async fn connect_normalizes_address_and_reports_once() {
        let channel = PotChannel::new();
        let mut status = channel.status();

        channel.connect("192.168.1.100").unwrap();
        assert_eq!(channel.current_status(), "Connecting...");

        wait_status(&mut status, |s| s.starts_with("Connected")).await;
        assert_eq!(channel.address(), Some("http://192.168.1.100".to_owned()));
        assert!(channel.is_connected());

        let reading = channel.last_reading().borrow().clone().unwrap();
        assert_eq!(
            reading.to_string(),
            "Temperature: 22°C\nHumidity: 65%\nSoil Moisture: 80%"
        );
    }

    #[tokio::test]
    async fn connect_rejects_empty_address() {
        let channel = PotChannel::new();
        let err = channel.connect("   ").unwrap_err();
        assert!(matches!(err, DeviceError::InvalidAddress { .. }));
        assert_eq!(channel.current_status(), "Disconnected");
    }

    #[tokio::test(start_paused = true)]
    async fn mode_command_status_names_the_mode() {
        let channel = PotChannel::new();
        let mut status = channel.status();

        channel.connect("pot.local").unwrap();
        wait_status(&mut status, |s| s.starts_with("Connected")).await;

        channel.send_mode_command(true).unwrap();
        let line = wait_status(&mut status, |s| s.contains("mode set")).await;
        assert!(line.contains("automatic"));

        channel.send_mode_command(false).unwrap();
        let line = wait_status(&mut status, |s| s.contains("manual")).await;
        assert!(line.contains("manual"));
    }

    #[tokio::test]
    async fn mode_command_requires_connection() {
        let channel = PotChannel::new();
        let err = channel.send_mode_command(true).unwrap_err();
        assert_eq!(err, DeviceError::NotConnected);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_refreshes_the_reading() {
        let channel = PotChannel::new();
        let mut status = channel.status();

        channel.connect("pot.local").unwrap();
        wait_status(&mut status, |s| s.starts_with("Connected")).await;
        let first = channel.last_reading().borrow().clone().unwrap();

        channel.fetch_data().unwrap();
        wait_status(&mut status, |s| s == "Fetching data...").await;
        wait_status(&mut status, |s| s.starts_with("Connected")).await;

        let second = channel.last_reading().borrow().clone().unwrap();
        assert!(second.received_at >= first.received_at);
    }
}
