use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString};

use crate::model::DocumentId;
use crate::store::Identified;

// ── PlantCategory ───────────────────────────────────────────────────

/// Coarse plant classification, shown as a picker in the app.
///
/// Serialized as its display string; unknown strings deserialize to
/// [`Other`](Self::Other) so old clients' data never fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
pub enum PlantCategory {
    Fruit,
    Vegetable,
    Herb,
    #[default]
    Flower,
    Other,
}

impl Serialize for PlantCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlantCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_str(&raw).unwrap_or(Self::Other))
    }
}

// ── SensorReading ───────────────────────────────────────────────────

/// The last sensor report received from a paired pot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub soil_moisture_pct: f32,
    pub received_at: DateTime<Utc>,
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Temperature: {:.0}°C\nHumidity: {:.0}%\nSoil Moisture: {:.0}%",
            self.temperature_c, self.humidity_pct, self.soil_moisture_pct
        )
    }
}

// ── Plant ───────────────────────────────────────────────────────────

/// A plant owned by a user, with its care sheet and last pot report.
///
/// The list is an unordered set keyed by document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: DocumentId,
    pub name: String,
    pub display_name: String,
    pub category: PlantCategory,
    pub watering_frequency: String,
    pub watering_amount: String,
    pub sunlight_needs: String,
    pub care_instructions: String,
    pub last_reading: Option<SensorReading>,
}

impl Identified for Plant {
    fn id(&self) -> &DocumentId {
        &self.id
    }
}

/// Fields for creating or replacing a plant. The cloud assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlantDraft {
    pub name: String,
    pub display_name: String,
    pub category: PlantCategory,
    pub watering_frequency: String,
    pub watering_amount: String,
    pub sunlight_needs: String,
    pub care_instructions: String,
}

impl PlantDraft {
    /// A draft with just a name and category; care fields empty until a
    /// care-guide lookup fills them.
    pub fn named(name: impl Into<String>, category: PlantCategory) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            category,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_serde() {
        let json = serde_json::to_string(&PlantCategory::Herb).expect("serializes");
        assert_eq!(json, "\"Herb\"");
        let back: PlantCategory = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, PlantCategory::Herb);
    }

    #[test]
    fn unknown_category_falls_back_to_other() {
        let parsed: PlantCategory = serde_json::from_str("\"Cactus\"").expect("deserializes");
        assert_eq!(parsed, PlantCategory::Other);
    }

    #[test]
    fn reading_renders_pot_report_format() {
        let reading = SensorReading {
            temperature_c: 22.0,
            humidity_pct: 65.0,
            soil_moisture_pct: 80.0,
            received_at: Utc::now(),
        };
        assert_eq!(
            reading.to_string(),
            "Temperature: 22°C\nHumidity: 65%\nSoil Moisture: 80%"
        );
    }
}
