// ── Smart-pot device link ──
//
// Two transports to a pot accessory: the short-range radio (scan/connect
// state machine driven by adapter events) and the fixed-latency Wi-Fi
// command channel. Both are best-effort; failures surface as status and
// error strings, never as panics or retries.

mod adapter;
mod link;
mod sim;
mod wifi;

pub use adapter::{AdapterEvent, AdapterState, RadioAdapter};
pub use link::{DeviceLink, LinkState};
pub use sim::{SimulatedPot, SimulatedRadio};
pub use wifi::PotChannel;
