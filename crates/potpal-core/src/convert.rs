// ── Wire-to-domain conversions ──
//
// Bridges raw `potpal_api::Document` payloads into domain types and
// domain requests back into write payloads. Documents that fail to parse
// are logged and dropped rather than failing the whole snapshot.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use potpal_api::Document;

use crate::model::{
    DocumentId, JournalEntry, Plant, PlantCategory, PlantDraft, SensorReading, TaskItem,
};

// ── Field payloads (document body without the id) ───────────────────

#[derive(Deserialize)]
struct TaskFields {
    name: String,
    #[serde(default)]
    completed: bool,
}

#[derive(Deserialize)]
struct JournalFields {
    content: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    plant_name: Option<String>,
}

#[derive(Deserialize)]
struct PlantFields {
    name: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    category: PlantCategory,
    #[serde(default)]
    watering_frequency: String,
    #[serde(default)]
    watering_amount: String,
    #[serde(default)]
    sunlight_needs: String,
    #[serde(default)]
    care_instructions: String,
    #[serde(default)]
    last_reading: Option<SensorReading>,
}

fn parse_fields<F: serde::de::DeserializeOwned>(doc: &Document, kind: &'static str) -> Option<F> {
    match serde_json::from_value(doc.data.clone()) {
        Ok(fields) => Some(fields),
        Err(e) => {
            warn!(id = %doc.id, kind, error = %e, "dropping unparseable document");
            None
        }
    }
}

// ── Document -> domain ──────────────────────────────────────────────

pub fn task_from_document(doc: &Document) -> Option<TaskItem> {
    let fields: TaskFields = parse_fields(doc, "task")?;
    Some(TaskItem {
        id: DocumentId::from(doc.id.clone()),
        name: fields.name,
        completed: fields.completed,
    })
}

pub fn journal_from_document(doc: &Document) -> Option<JournalEntry> {
    let fields: JournalFields = parse_fields(doc, "journal entry")?;
    Some(JournalEntry {
        id: DocumentId::from(doc.id.clone()),
        content: fields.content,
        created_at: fields.created_at,
        plant_name: fields.plant_name,
    })
}

pub fn plant_from_document(doc: &Document) -> Option<Plant> {
    let fields: PlantFields = parse_fields(doc, "plant")?;
    let display_name = if fields.display_name.is_empty() {
        fields.name.clone()
    } else {
        fields.display_name
    };
    Some(Plant {
        id: DocumentId::from(doc.id.clone()),
        name: fields.name,
        display_name,
        category: fields.category,
        watering_frequency: fields.watering_frequency,
        watering_amount: fields.watering_amount,
        sunlight_needs: fields.sunlight_needs,
        care_instructions: fields.care_instructions,
        last_reading: fields.last_reading,
    })
}

// ── Snapshot mappers (one per mirror) ───────────────────────────────

pub(crate) fn tasks_from_documents(docs: Vec<Document>) -> Vec<TaskItem> {
    docs.iter().filter_map(task_from_document).collect()
}

/// Journal snapshots are re-sorted newest-first after conversion, so the
/// mirror holds the ordering invariant even if a delivery arrives unsorted.
pub(crate) fn journal_from_documents(docs: Vec<Document>) -> Vec<JournalEntry> {
    let mut entries: Vec<JournalEntry> = docs.iter().filter_map(journal_from_document).collect();
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    entries
}

pub(crate) fn plants_from_documents(docs: Vec<Document>) -> Vec<Plant> {
    docs.iter().filter_map(plant_from_document).collect()
}

// ── Domain -> write payloads ────────────────────────────────────────

pub fn task_payload(name: &str) -> Value {
    json!({ "name": name, "completed": false })
}

pub fn task_completed_patch(completed: bool) -> Value {
    json!({ "completed": completed })
}

pub fn journal_payload(content: &str, plant_name: Option<&str>, created_at: DateTime<Utc>) -> Value {
    json!({
        "content": content,
        "created_at": created_at,
        "plant_name": plant_name,
    })
}

pub fn plant_payload(draft: &PlantDraft) -> Value {
    json!({
        "name": draft.name,
        "display_name": draft.display_name,
        "category": draft.category,
        "watering_frequency": draft.watering_frequency,
        "watering_amount": draft.watering_amount,
        "sunlight_needs": draft.sunlight_needs,
        "care_instructions": draft.care_instructions,
    })
}

pub fn reading_patch(reading: &SensorReading) -> Value {
    json!({ "last_reading": reading })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn doc(id: &str, data: Value) -> Document {
        Document {
            id: id.to_owned(),
            data,
        }
    }

    #[test]
    fn task_conversion_injects_document_id() {
        let task = task_from_document(&doc(
            "t1",
            json!({ "name": "Water plants", "completed": true }),
        ))
        .unwrap();
        assert_eq!(task.id.as_str(), "t1");
        assert_eq!(task.name, "Water plants");
        assert!(task.completed);
    }

    #[test]
    fn task_missing_name_is_dropped() {
        assert!(task_from_document(&doc("t1", json!({ "completed": false }))).is_none());
    }

    #[test]
    fn journal_snapshot_is_sorted_newest_first() {
        let docs = vec![
            doc("j1", json!({ "content": "old", "created_at": "2025-07-01T10:00:00Z" })),
            doc("j2", json!({ "content": "new", "created_at": "2025-07-22T10:00:00Z" })),
            doc("j3", json!({ "content": "mid", "created_at": "2025-07-10T10:00:00Z" })),
        ];

        let entries = journal_from_documents(docs);
        let contents: Vec<&str> = entries.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["new", "mid", "old"]);
    }

    #[test]
    fn plant_display_name_defaults_to_name() {
        let plant = plant_from_document(&doc(
            "p1",
            json!({ "name": "basil", "category": "Herb" }),
        ))
        .unwrap();
        assert_eq!(plant.display_name, "basil");
        assert_eq!(plant.category, PlantCategory::Herb);
    }

    #[test]
    fn plant_with_unknown_category_still_loads() {
        let plant = plant_from_document(&doc(
            "p1",
            json!({ "name": "saguaro", "category": "Cactus" }),
        ))
        .unwrap();
        assert_eq!(plant.category, PlantCategory::Other);
    }
}
