use serde::{Deserialize, Serialize};

use crate::model::PotId;

/// A pot seen during a radio discovery scan.
///
/// Transient: the discovery list exists only for the duration of a scan
/// and is cleared on rescan or adapter power loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredPot {
    pub id: PotId,
    /// Advertised name, when the pot broadcast one.
    pub name: Option<String>,
    /// Signal strength at discovery time (dBm).
    pub rssi: i16,
}

impl DiscoveredPot {
    /// The name to show a user: advertised name, or the address.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}
