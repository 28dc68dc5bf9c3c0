// User profile and text-size preference
//
// One row per cloud account; the text-size preference is a display scale
// factor the UI applies to every font.

use serde::{Deserialize, Serialize};

use crate::{LocalStore, LocalStoreError};

pub const DEFAULT_TEXT_SCALE: f64 = 1.0;

/// Locally-stored profile for a cloud account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub user_id: String,
    pub name: String,
    pub bio: String,
    pub text_scale: f64,
}

impl Profile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: String::new(),
            bio: String::new(),
            text_scale: DEFAULT_TEXT_SCALE,
        }
    }
}

impl LocalStore {
    /// The profile for `user_id`, or a default one if none is stored yet.
    pub async fn profile(&self, user_id: &str) -> Result<Profile, LocalStoreError> {
        let row = sqlx::query_as::<_, Profile>(
            "SELECT user_id, name, bio, text_scale FROM profile WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.unwrap_or_else(|| Profile::new(user_id)))
    }

    /// Insert or replace the profile row.
    pub async fn save_profile(&self, profile: &Profile) -> Result<(), LocalStoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO profile (user_id, name, bio, text_scale) VALUES (?, ?, ?, ?)",
        )
        .bind(&profile.user_id)
        .bind(&profile.name)
        .bind(&profile.bio)
        .bind(profile.text_scale)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Update just the text-size preference.
    pub async fn set_text_scale(&self, user_id: &str, scale: f64) -> Result<(), LocalStoreError> {
        let mut profile = self.profile(user_id).await?;
        profile.text_scale = scale;
        self.save_profile(&profile).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::temp_store;

    #[tokio::test]
    async fn missing_profile_defaults() {
        let (_dir, store) = temp_store().await;

        let profile = store.profile("user-1").await.expect("loads");
        assert_eq!(profile.user_id, "user-1");
        assert!((profile.text_scale - DEFAULT_TEXT_SCALE).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn save_and_reload_round_trips() {
        let (_dir, store) = temp_store().await;

        let mut profile = Profile::new("user-1");
        profile.name = "Adi".into();
        profile.bio = "Balcony gardener".into();
        store.save_profile(&profile).await.expect("saves");

        let loaded = store.profile("user-1").await.expect("loads");
        assert_eq!(loaded, profile);
    }

    #[tokio::test]
    async fn text_scale_updates_in_place() {
        let (_dir, store) = temp_store().await;

        store.set_text_scale("user-1", 1.4).await.expect("updates");
        let profile = store.profile("user-1").await.expect("loads");
        assert!((profile.text_scale - 1.4).abs() < f64::EPSILON);
    }
}
