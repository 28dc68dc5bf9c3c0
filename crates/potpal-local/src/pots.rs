// Paired pot records
//
// Pots live only on the device that paired them. Timestamps are stored
// as RFC 3339 text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LocalStore, LocalStoreError};

/// A pot paired to this device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotRecord {
    pub id: Uuid,
    pub name: String,
    pub plant_type: String,
    pub last_watered: DateTime<Utc>,
    pub notes: String,
}

impl PotRecord {
    /// A freshly paired pot, watered "now".
    pub fn new(name: impl Into<String>, plant_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            plant_type: plant_type.into(),
            last_watered: Utc::now(),
            notes: String::new(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct PotRow {
    id: String,
    name: String,
    plant_type: String,
    last_watered: String,
    notes: String,
}

impl PotRow {
    fn into_record(self) -> Option<PotRecord> {
        let id = Uuid::parse_str(&self.id).ok()?;
        let last_watered = DateTime::parse_from_rfc3339(&self.last_watered)
            .ok()?
            .with_timezone(&Utc);
        Some(PotRecord {
            id,
            name: self.name,
            plant_type: self.plant_type,
            last_watered,
            notes: self.notes,
        })
    }
}

impl LocalStore {
    /// Insert or replace a pot record.
    pub async fn save_pot(&self, pot: &PotRecord) -> Result<(), LocalStoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO pots (id, name, plant_type, last_watered, notes) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(pot.id.to_string())
        .bind(&pot.name)
        .bind(&pot.plant_type)
        .bind(pot.last_watered.to_rfc3339())
        .bind(&pot.notes)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// All paired pots, alphabetical by name.
    pub async fn pots(&self) -> Result<Vec<PotRecord>, LocalStoreError> {
        let rows = sqlx::query_as::<_, PotRow>(
            "SELECT id, name, plant_type, last_watered, notes FROM pots ORDER BY name",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().filter_map(PotRow::into_record).collect())
    }

    /// Remove a pot record. Returns `true` if a record was deleted.
    pub async fn remove_pot(&self, id: Uuid) -> Result<bool, LocalStoreError> {
        let result = sqlx::query("DELETE FROM pots WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Stamp a pot as watered now.
    pub async fn touch_watered(&self, id: Uuid) -> Result<(), LocalStoreError> {
        sqlx::query("UPDATE pots SET last_watered = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
