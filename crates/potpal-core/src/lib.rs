// potpal-core: Reactive data layer between potpal-api and consumers (CLI).

pub mod chat;
pub mod config;
pub mod convert;
pub mod device;
pub mod error;
pub mod model;
pub mod remote;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use chat::{ChatRole, ChatSession, ChatTurn};
pub use config::SessionConfig;
pub use error::{AuthError, ChatError, DeviceError, SyncError};
pub use remote::{Collection, RemoteStore};
pub use session::{AuthState, SyncSession};
pub use store::{LiveList, SessionCaches};
pub use stream::ListStream;

pub use device::{
    AdapterEvent, AdapterState, DeviceLink, LinkState, PotChannel, RadioAdapter, SimulatedPot,
    SimulatedRadio,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    DiscoveredPot, DocumentId, JournalEntry, Plant, PlantCategory, PlantDraft, PotId,
    SensorReading, TaskItem, UserId,
};
