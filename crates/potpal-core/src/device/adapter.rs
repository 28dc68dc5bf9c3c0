// ── Radio adapter contract ──
//
// The platform radio is an external collaborator: commands go out through
// the `RadioAdapter` trait, and everything that happens comes back as
// `AdapterEvent`s on a single channel. One consumer (`DeviceLink`)
// dispatches on the tag.

use strum::Display;

use crate::model::PotId;

/// Power/availability state of the radio adapter.
///
/// Only `PoweredOn` accepts scans and connects; every other state is an
/// unconditional reset of in-progress work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AdapterState {
    Unknown,
    Resetting,
    Unsupported,
    Unauthorized,
    PoweredOff,
    PoweredOn,
}

/// Everything the adapter can report, as one tagged stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterEvent {
    StateChanged(AdapterState),
    DeviceDiscovered {
        id: PotId,
        name: Option<String>,
        rssi: i16,
    },
    Connected {
        id: PotId,
    },
    ConnectFailed {
        id: PotId,
        reason: String,
    },
    /// `error` distinguishes a transport drop from an explicit
    /// user-requested disconnect: present only for the former.
    Disconnected {
        id: PotId,
        error: Option<String>,
    },
}

/// Commands the link sends to the platform radio.
///
/// All methods are fire-and-forget: outcomes arrive as [`AdapterEvent`]s.
pub trait RadioAdapter: Send + Sync + 'static {
    fn start_scan(&self);
    fn stop_scan(&self);
    fn connect(&self, id: &PotId);
    fn cancel_connection(&self, id: &PotId);
}
