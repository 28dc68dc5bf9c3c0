use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::DocumentId;
use crate::store::Identified;

/// A dated journal entry, optionally tied to a plant by name.
///
/// The journal mirror is ordered newest-first by `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: DocumentId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub plant_name: Option<String>,
}

impl Identified for JournalEntry {
    fn id(&self) -> &DocumentId {
        &self.id
    }
}
