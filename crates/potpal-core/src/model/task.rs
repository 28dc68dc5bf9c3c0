use serde::{Deserialize, Serialize};

use crate::model::DocumentId;
use crate::store::Identified;

/// A to-do item owned by a user.
///
/// The list is an unordered set keyed by document id; the store delivers
/// it in no guaranteed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: DocumentId,
    pub name: String,
    pub completed: bool,
}

impl Identified for TaskItem {
    fn id(&self) -> &DocumentId {
        &self.id
    }
}
