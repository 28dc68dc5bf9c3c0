// Plant reference library
//
// Built-in care sheets for common plants, available offline. Seeded once;
// lookups are case-insensitive by name.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{LocalStore, LocalStoreError};

/// One reference care sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReferencePlant {
    pub name: String,
    pub category: String,
    pub watering: String,
    pub sunlight: String,
    pub soil: String,
    pub notes: Option<String>,
}

impl LocalStore {
    /// All reference plants, alphabetical.
    pub async fn reference_plants(&self) -> Result<Vec<ReferencePlant>, LocalStoreError> {
        let rows = sqlx::query_as::<_, ReferencePlant>(
            "SELECT name, category, watering, sunlight, soil, notes \
             FROM plant_library ORDER BY name",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    /// Case-insensitive lookup by plant name.
    pub async fn reference_plant(
        &self,
        name: &str,
    ) -> Result<Option<ReferencePlant>, LocalStoreError> {
        let row = sqlx::query_as::<_, ReferencePlant>(
            "SELECT name, category, watering, sunlight, soil, notes \
             FROM plant_library WHERE name = ? COLLATE NOCASE",
        )
        .bind(name)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    /// Insert the built-in care sheets. No-op when the library is already
    /// populated.
    pub(crate) async fn seed_reference_library(&self) -> Result<(), LocalStoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM plant_library")
            .fetch_one(self.pool())
            .await?;
        if count > 0 {
            return Ok(());
        }

        let mut tx = self.pool().begin().await?;
        for plant in builtin_library() {
            sqlx::query(
                "INSERT INTO plant_library (name, category, watering, sunlight, soil, notes) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&plant.name)
            .bind(&plant.category)
            .bind(&plant.watering)
            .bind(&plant.sunlight)
            .bind(&plant.soil)
            .bind(&plant.notes)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!("plant reference library seeded");
        Ok(())
    }
}

/// The built-in reference set.
fn builtin_library() -> Vec<ReferencePlant> {
    fn sheet(
        name: &str,
        category: &str,
        watering: &str,
        sunlight: &str,
        soil: &str,
        notes: &str,
    ) -> ReferencePlant {
        ReferencePlant {
            name: name.to_owned(),
            category: category.to_owned(),
            watering: watering.to_owned(),
            sunlight: sunlight.to_owned(),
            soil: soil.to_owned(),
            notes: Some(notes.to_owned()),
        }
    }

    vec![
        sheet(
            "Basil",
            "Herb",
            "1-1.5 in per week, water every 2-3 days",
            "Full sun, 6-8 hours of direct sunlight with some afternoon shade in hotter climates",
            "Rich, well-drained, moist soil",
            "Prune regularly by pinching off flower buds and harvesting shoots. Harvest by \
             snipping stems above leaf nodes and taking a few leaves from each stem. Check for \
             pests & disease.",
        ),
        sheet(
            "Tomato",
            "Fruit",
            "1-2 in per week, water every 2-4 days",
            "Full sun, 6-8 hours of direct sunlight with some afternoon shade in hotter climates",
            "Well draining, nitrogen-rich soil w/ compost and eggshells",
            "Fertilizer and support needed, apply mulch around base and prune by removing \
             suckers. Harvest when fully colored and slightly soft. Check for pests & disease.",
        ),
        sheet(
            "Hibiscus",
            "Flower",
            "1 inch per week, water every day",
            "Full sun, 6 hours of direct sunlight daily.",
            "Consistently moist but not soggy soil",
            "Regular fertilization with fertilizer high in potassium and low in phosphorus. \
             Prune hibiscus plants and check for pests & disease. Bring hibiscus inside during \
             winter/cold seasons. Remove spent blooms.",
        ),
        sheet(
            "Orchid",
            "Flower",
            "water every week",
            "Bright indirect sunlight",
            "Requires a specialized, airy, well-draining potting mix instead of regular potting soil",
            "Use lukewarm water, avoid overwatering. Water thoroughly but infrequently. Moderate \
             to high humidity. Remove dead leaves/flowers and observe for pests/diseases.",
        ),
        sheet(
            "Cucumber",
            "Vegetable",
            "1 in per week, 2-3 days",
            "Full sun, 6-8 hours of direct sunlight daily",
            "Fertile, well-drained soil rich in organic matter.",
            "Regular feeding with a balanced, soluble fertilizer during fruiting stage. Support \
             needed to prevent disease, circulate air, and straighter fruit. Avoid overwatering.",
        ),
        sheet(
            "Strawberry",
            "Fruit",
            "1-1.5 in per week, water twice a week",
            "Full sun, 6-8 hours of direct sunlight.",
            "Slightly acidic, loamy, well-draining soil",
            "Organic fertilizer, mulch around plants to retain moisture, pest and disease \
             control, replant every few years to increase productivity.",
        ),
        sheet(
            "Radish",
            "Vegetable",
            "1 in per week, water 1-2 times a week",
            "Full sun & 6 hours of sunlight daily, but can tolerate partial shade",
            "Well-drained, moist, loose soil that's slightly organic",
            "Adding organic matter to soil can improve growth, but not too much. Check for \
             pests/diseases.",
        ),
        sheet(
            "Cilantro",
            "Herb",
            "",
            "Full sun, but may need shade in hot climates",
            "Loose, loamy, well-draining soil, slightly acidic pH",
            "Thrives in cooler temperatures. Harvest by cutting stems near the base, pinch off \
             flower stalks before they mature. Delay bolting by watering well, provide some \
             shade, harvest frequently.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::test_util::temp_store;

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let (_dir, store) = temp_store().await;

        let plant = store
            .reference_plant("basil")
            .await
            .expect("query runs")
            .expect("basil is in the library");
        assert_eq!(plant.name, "Basil");
        assert_eq!(plant.category, "Herb");
    }

    #[tokio::test]
    async fn unknown_plant_returns_none() {
        let (_dir, store) = temp_store().await;
        let missing = store.reference_plant("Triffid").await.expect("query runs");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let (_dir, store) = temp_store().await;
        let before = store.reference_plants().await.expect("loads").len();

        store.seed_reference_library().await.expect("reseed is a no-op");
        let after = store.reference_plants().await.expect("loads").len();
        assert_eq!(before, after);
    }
}
