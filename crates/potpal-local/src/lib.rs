//! On-device cache for the PotPal companion.
//!
//! SQLite-backed storage for the things that never live in the cloud:
//! the built-in plant reference library, locally-paired pot records, and
//! the user profile with its text-size preference.

mod library;
mod pots;
mod profile;

pub use library::ReferencePlant;
pub use pots::PotRecord;
pub use profile::Profile;

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to the on-device store. Cheaply cloneable (shares the pool).
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    /// Open (creating if missing) the store at `path` and run migrations.
    ///
    /// Seeds the plant reference library on first open.
    pub async fn open(path: &Path) -> Result<Self, LocalStoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", path.display());
        let options = SqliteConnectOptions::from_str(&db_url)?
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let store = Self { pool };
        store.seed_reference_library().await?;
        debug!(path = %path.display(), "local store opened");
        Ok(store)
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::LocalStore;
    use tempfile::TempDir;

    /// An isolated store in a temp directory. Keep the `TempDir` alive for
    /// the duration of the test.
    pub(crate) async fn temp_store() -> (TempDir, LocalStore) {
        let dir = TempDir::new().expect("temp dir");
        let store = LocalStore::open(&dir.path().join("potpal.db"))
            .await
            .expect("store opens");
        (dir, store)
    }
}
