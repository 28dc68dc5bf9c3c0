// ── Live mirror storage ──
//
// Each remote collection is mirrored into a `LiveList`; the session's
// three mirrors are grouped in `SessionCaches`.

mod live_list;

pub use live_list::{Identified, LiveList};

use std::sync::Arc;

use crate::model::{JournalEntry, Plant, TaskItem};
use crate::stream::ListStream;

/// The session's three live mirrors.
///
/// Non-authoritative caches of the cloud store: each reflects the most
/// recent snapshot delivered by its subscription and is cleared on
/// sign-out. Reads are wait-free; all mutation flows through the
/// subscription mirror tasks (and the teardown path).
pub struct SessionCaches {
    pub(crate) tasks: LiveList<TaskItem>,
    pub(crate) journal: LiveList<JournalEntry>,
    pub(crate) plants: LiveList<Plant>,
}

impl SessionCaches {
    pub(crate) fn new() -> Self {
        Self {
            tasks: LiveList::new(),
            journal: LiveList::new(),
            plants: LiveList::new(),
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn tasks_snapshot(&self) -> Arc<Vec<Arc<TaskItem>>> {
        self.tasks.snapshot()
    }

    pub fn journal_snapshot(&self) -> Arc<Vec<Arc<JournalEntry>>> {
        self.journal.snapshot()
    }

    pub fn plants_snapshot(&self) -> Arc<Vec<Arc<Plant>>> {
        self.plants.snapshot()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_tasks(&self) -> ListStream<TaskItem> {
        ListStream::new(self.tasks.subscribe())
    }

    pub fn subscribe_journal(&self) -> ListStream<JournalEntry> {
        ListStream::new(self.journal.subscribe())
    }

    pub fn subscribe_plants(&self) -> ListStream<Plant> {
        ListStream::new(self.plants.subscribe())
    }

    /// Empty all three mirrors (sign-out path).
    pub(crate) fn clear_all(&self) {
        self.tasks.clear();
        self.journal.clear();
        self.plants.clear();
    }
}
