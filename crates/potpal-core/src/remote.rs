// ── Remote store seam ──
//
// `SyncSession` talks to the cloud through this trait so its lifecycle
// logic is testable against an in-memory store. The production
// implementation is `potpal_api::CloudClient`.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::Value;

use potpal_api::{Account, CloudClient, Document, Error, OrderBy, SnapshotListener};

use crate::model::{DocumentId, UserId};

// ── Collection ──────────────────────────────────────────────────────

/// The three per-user collections the session mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tasks,
    Journal,
    Plants,
}

impl Collection {
    /// The collection's path segment in the document API.
    pub fn path(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Journal => "journal",
            Self::Plants => "plants",
        }
    }
}

// ── RemoteStore ─────────────────────────────────────────────────────

/// The cloud-store contract the session consumes.
///
/// Implementations must be cheaply cloneable handles onto shared state:
/// signing in through one clone signs in all of them.
#[allow(async_fn_in_trait)]
pub trait RemoteStore: Clone + Send + Sync + 'static {
    fn current_account(&self) -> Option<Account>;

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Account, Error>;

    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<Account, Error>;

    fn sign_out(&self) -> Result<(), Error>;

    async fn delete_account(&self) -> Result<(), Error>;

    async fn fetch(
        &self,
        user: &UserId,
        collection: Collection,
        order: Option<&OrderBy>,
    ) -> Result<Vec<Document>, Error>;

    async fn add(
        &self,
        user: &UserId,
        collection: Collection,
        data: Value,
    ) -> Result<Document, Error>;

    async fn update(
        &self,
        user: &UserId,
        collection: Collection,
        id: &DocumentId,
        patch: Value,
    ) -> Result<(), Error>;

    async fn remove(
        &self,
        user: &UserId,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<(), Error>;

    /// Open a live subscription. The returned handle must deliver ordered
    /// snapshots until [`SnapshotListener::shutdown`] is called.
    fn listen(
        &self,
        user: &UserId,
        collection: Collection,
        order: Option<OrderBy>,
        poll_interval: Duration,
    ) -> SnapshotListener;
}

impl RemoteStore for CloudClient {
    fn current_account(&self) -> Option<Account> {
        CloudClient::current_account(self)
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Account, Error> {
        CloudClient::sign_in(self, email, password).await
    }

    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<Account, Error> {
        CloudClient::sign_up(self, email, password).await
    }

    fn sign_out(&self) -> Result<(), Error> {
        CloudClient::sign_out(self)
    }

    async fn delete_account(&self) -> Result<(), Error> {
        CloudClient::delete_account(self).await
    }

    async fn fetch(
        &self,
        user: &UserId,
        collection: Collection,
        order: Option<&OrderBy>,
    ) -> Result<Vec<Document>, Error> {
        self.list_documents(user.as_str(), collection.path(), order)
            .await
    }

    async fn add(
        &self,
        user: &UserId,
        collection: Collection,
        data: Value,
    ) -> Result<Document, Error> {
        self.add_document(user.as_str(), collection.path(), &data)
            .await
    }

    async fn update(
        &self,
        user: &UserId,
        collection: Collection,
        id: &DocumentId,
        patch: Value,
    ) -> Result<(), Error> {
        self.update_document(user.as_str(), collection.path(), id.as_str(), &patch)
            .await
    }

    async fn remove(
        &self,
        user: &UserId,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<(), Error> {
        self.delete_document(user.as_str(), collection.path(), id.as_str())
            .await
    }

    fn listen(
        &self,
        user: &UserId,
        collection: Collection,
        order: Option<OrderBy>,
        poll_interval: Duration,
    ) -> SnapshotListener {
        CloudClient::listen(self, user.as_str(), collection.path(), order, poll_interval)
    }
}
