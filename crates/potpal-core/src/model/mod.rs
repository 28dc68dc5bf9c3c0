// ── Domain model ──

mod ids;
mod journal;
mod plant;
mod pot;
mod task;

pub use ids::{DocumentId, PotId, UserId};
pub use journal::JournalEntry;
pub use plant::{Plant, PlantCategory, PlantDraft, SensorReading};
pub use pot::DiscoveredPot;
pub use task::TaskItem;
