//! Async clients for every remote surface the PotPal companion consumes:
//! the cloud document store with account identity, the plant care-guide
//! lookup service, and the generative-text helper backend.
//!
//! This crate owns transport mechanics only -- URL construction, envelope
//! parsing, session tokens, polling listeners. `potpal-core` translates the
//! error type here into its user-facing taxonomies.

pub mod careguide;
pub mod cloud;
pub mod error;
pub mod genai;
pub mod transport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use careguide::{CareGuide, CareGuideClient};
pub use cloud::listener::{SnapshotListener, SnapshotResult};
pub use cloud::{Account, CloudClient, Document, OrderBy};
pub use error::Error;
pub use genai::{GenAiClient, GenAiParams};
pub use transport::TransportConfig;
