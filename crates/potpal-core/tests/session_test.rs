#![allow(clippy::unwrap_used)]
//! Session lifecycle tests over an in-memory store.
//!
//! The store implements `RemoteStore` with hand-driven snapshot channels,
//! so tests can deliver (and mis-deliver) snapshots at will: late
//! callbacks after logout, duplicate ids, unsorted journal batches.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::sync::mpsc;

use potpal_api::{Account, Document, Error, OrderBy, SnapshotListener, SnapshotResult};
use potpal_core::{
    AuthError, Collection, DocumentId, RemoteStore, SessionConfig, SyncError, SyncSession,
};
use potpal_core::model::UserId;

// ── In-memory store ─────────────────────────────────────────────────

#[derive(Clone, Default)]
struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    current: Option<Account>,
    reject_password: bool,
    fail_sign_out: bool,
    next_id: u64,
    collections: HashMap<&'static str, Vec<Document>>,
    feeds: HashMap<&'static str, mpsc::Sender<SnapshotResult>>,
    added: Vec<(&'static str, Value)>,
}

impl MemoryStore {
    fn new() -> Self {
        Self::default()
    }

    fn reject_password(&self) {
        self.inner.lock().unwrap().reject_password = true;
    }

    fn fail_sign_out(&self) {
        self.inner.lock().unwrap().fail_sign_out = true;
    }

    fn set_documents(&self, collection: Collection, docs: Vec<Document>) {
        self.inner
            .lock()
            .unwrap()
            .collections
            .insert(collection.path(), docs);
    }

    /// The sender feeding the most recently opened listener.
    fn feed(&self, collection: Collection) -> mpsc::Sender<SnapshotResult> {
        self.inner
            .lock()
            .unwrap()
            .feeds
            .get(collection.path())
            .expect("listener registered")
            .clone()
    }

    fn added(&self) -> Vec<(&'static str, Value)> {
        self.inner.lock().unwrap().added.clone()
    }
}

impl RemoteStore for MemoryStore {
    fn current_account(&self) -> Option<Account> {
        self.inner.lock().unwrap().current.clone()
    }

    async fn sign_in(&self, email: &str, _password: &SecretString) -> Result<Account, Error> {
        let mut inner = self.inner.lock().unwrap();
        if inner.reject_password {
            return Err(Error::Authentication {
                message: "INVALID_PASSWORD".into(),
                code: Some("INVALID_PASSWORD".into()),
            });
        }
        let account = Account {
            user_id: "user-1".into(),
            email: email.to_owned(),
        };
        inner.current = Some(account.clone());
        Ok(account)
    }

    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<Account, Error> {
        self.sign_in(email, password).await
    }

    fn sign_out(&self) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_sign_out {
            return Err(Error::Api {
                message: "sign-out rejected".into(),
                status: Some(500),
            });
        }
        inner.current = None;
        Ok(())
    }

    async fn delete_account(&self) -> Result<(), Error> {
        self.inner.lock().unwrap().current = None;
        Ok(())
    }

    async fn fetch(
        &self,
        _user: &UserId,
        collection: Collection,
        _order: Option<&OrderBy>,
    ) -> Result<Vec<Document>, Error> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .collections
            .get(collection.path())
            .cloned()
            .unwrap_or_default())
    }

    async fn add(
        &self,
        _user: &UserId,
        collection: Collection,
        data: Value,
    ) -> Result<Document, Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let doc = Document {
            id: format!("doc-{}", inner.next_id),
            data: data.clone(),
        };
        inner.added.push((collection.path(), data));
        inner
            .collections
            .entry(collection.path())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn update(
        &self,
        _user: &UserId,
        collection: Collection,
        id: &DocumentId,
        patch: Value,
    ) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(docs) = inner.collections.get_mut(collection.path()) {
            if let Some(doc) = docs.iter_mut().find(|d| d.id == id.as_str()) {
                if let (Some(data), Some(patch)) = (doc.data.as_object_mut(), patch.as_object()) {
                    for (k, v) in patch {
                        data.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        Ok(())
    }

    async fn remove(
        &self,
        _user: &UserId,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(docs) = inner.collections.get_mut(collection.path()) {
            docs.retain(|d| d.id != id.as_str());
        }
        Ok(())
    }

    fn listen(
        &self,
        _user: &UserId,
        collection: Collection,
        _order: Option<OrderBy>,
        _poll_interval: Duration,
    ) -> SnapshotListener {
        let (tx, rx) = mpsc::channel(8);
        self.inner
            .lock()
            .unwrap()
            .feeds
            .insert(collection.path(), tx);
        SnapshotListener::from_channel(rx)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

fn task_doc(id: &str, name: &str) -> Document {
    Document {
        id: id.to_owned(),
        data: json!({ "name": name, "completed": false }),
    }
}

fn journal_doc(id: &str, content: &str, created_at: &str) -> Document {
    Document {
        id: id.to_owned(),
        data: json!({ "content": content, "created_at": created_at }),
    }
}

async fn login(session: &SyncSession<MemoryStore>) {
    session
        .login("gardener@example.com", &secret("hunter22"))
        .await
        .expect("login succeeds");
}

fn session() -> (MemoryStore, SyncSession<MemoryStore>) {
    let store = MemoryStore::new();
    let session = SyncSession::new(store.clone(), SessionConfig::default());
    (store, session)
}

/// Deliver a snapshot and wait for the mirror to apply it.
async fn deliver(
    store: &MemoryStore,
    session: &SyncSession<MemoryStore>,
    collection: Collection,
    docs: Vec<Document>,
) {
    match collection {
        Collection::Tasks => {
            let mut stream = session.tasks();
            store.feed(collection).send(Ok(docs)).await.unwrap();
            stream.changed().await.expect("mirror applies snapshot");
        }
        Collection::Journal => {
            let mut stream = session.journal();
            store.feed(collection).send(Ok(docs)).await.unwrap();
            stream.changed().await.expect("mirror applies snapshot");
        }
        Collection::Plants => {
            let mut stream = session.plants();
            store.feed(collection).send(Ok(docs)).await.unwrap();
            stream.changed().await.expect("mirror applies snapshot");
        }
    }
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn wrong_password_maps_to_wrong_secret_and_stays_signed_out() {
    let (store, session) = session();
    store.reject_password();

    let err = session
        .login("user@x.com", &secret("secret1"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::WrongSecret);
    assert!(!session.is_authenticated());
    assert!(session.tasks_snapshot().is_empty());
}

#[tokio::test]
async fn malformed_email_rejected_locally() {
    let (_store, session) = session();

    let err = session.login("not-an-email", &secret("pw")).await.unwrap_err();
    assert_eq!(err, AuthError::InvalidFormat);
}

#[tokio::test]
async fn login_populates_mirrors_from_initial_fetch() {
    let (store, session) = session();
    store.set_documents(
        Collection::Tasks,
        vec![task_doc("t1", "Water plants"), task_doc("t2", "Weed & prune plants")],
    );

    login(&session).await;

    let tasks = session.tasks_snapshot();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].name, "Water plants");
}

// ── Snapshot mirroring ──────────────────────────────────────────────

#[tokio::test]
async fn delivered_snapshot_replaces_the_cache() {
    let (store, session) = session();
    login(&session).await;

    deliver(&store, &session, Collection::Tasks, vec![task_doc("t1", "Water plants")]).await;
    assert_eq!(session.tasks_snapshot().len(), 1);

    deliver(
        &store,
        &session,
        Collection::Tasks,
        vec![task_doc("t2", "Repot basil"), task_doc("t3", "Mist orchid")],
    )
    .await;

    let tasks = session.tasks_snapshot();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.id.as_str() != "t1"));
}

#[tokio::test]
async fn duplicate_ids_within_a_snapshot_appear_once() {
    let (store, session) = session();
    login(&session).await;

    deliver(
        &store,
        &session,
        Collection::Tasks,
        vec![task_doc("t1", "Water plants"), task_doc("t1", "Water plants")],
    )
    .await;

    assert_eq!(session.tasks_snapshot().len(), 1);
}

#[tokio::test]
async fn repeated_identical_snapshots_do_not_duplicate() {
    let (store, session) = session();
    login(&session).await;

    session.add_task("Water plants").await.unwrap();
    deliver(&store, &session, Collection::Tasks, vec![task_doc("doc-1", "Water plants")]).await;
    deliver(&store, &session, Collection::Tasks, vec![task_doc("doc-1", "Water plants")]).await;

    assert_eq!(session.tasks_snapshot().len(), 1);
}

#[tokio::test]
async fn journal_cache_is_ordered_newest_first_for_any_delivery() {
    let (store, session) = session();
    login(&session).await;

    // Deliberately unsorted delivery.
    deliver(
        &store,
        &session,
        Collection::Journal,
        vec![
            journal_doc("j1", "old", "2025-07-01T10:00:00Z"),
            journal_doc("j2", "new", "2025-07-22T10:00:00Z"),
            journal_doc("j3", "mid", "2025-07-10T10:00:00Z"),
        ],
    )
    .await;

    let entries = session.journal_snapshot();
    let timestamps: Vec<_> = entries.iter().map(|e| e.created_at).collect();
    let mut sorted = timestamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(timestamps, sorted, "journal must be non-increasing by timestamp");
}

#[tokio::test]
async fn listener_error_keeps_previous_snapshot() {
    let (store, session) = session();
    login(&session).await;

    deliver(&store, &session, Collection::Tasks, vec![task_doc("t1", "Water plants")]).await;

    store
        .feed(Collection::Tasks)
        .send(Err(Error::Api {
            message: "transient".into(),
            status: Some(503),
        }))
        .await
        .unwrap();

    // Give the mirror a beat to process the error.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(session.tasks_snapshot().len(), 1, "cache retained on delivery error");
}

// ── Logout semantics ────────────────────────────────────────────────

#[tokio::test]
async fn logout_clears_caches_and_late_snapshots_are_noops() {
    let (store, session) = session();
    login(&session).await;

    deliver(&store, &session, Collection::Tasks, vec![task_doc("t1", "Water plants")]).await;
    let stale_feed = store.feed(Collection::Tasks);

    session.logout().await.unwrap();

    assert!(!session.is_authenticated());
    assert!(session.tasks_snapshot().is_empty());
    assert!(session.journal_snapshot().is_empty());
    assert!(session.plants_snapshot().is_empty());

    // The prior subscription is gone: a late delivery has nowhere to land.
    let late = stale_feed.send(Ok(vec![task_doc("t9", "stale")])).await;
    assert!(late.is_err(), "mirror channel must be closed after logout");
    assert!(session.tasks_snapshot().is_empty());
}

#[tokio::test]
async fn logout_tears_down_even_when_sign_out_fails() {
    let (store, session) = session();
    login(&session).await;
    deliver(&store, &session, Collection::Tasks, vec![task_doc("t1", "Water plants")]).await;
    let stale_feed = store.feed(Collection::Tasks);

    store.fail_sign_out();
    let result = session.logout().await;

    assert!(result.is_err(), "store failure still surfaces");
    assert!(!session.is_authenticated());
    assert!(session.tasks_snapshot().is_empty());
    assert!(stale_feed.send(Ok(Vec::new())).await.is_err());
}

#[tokio::test]
async fn logout_is_idempotent() {
    let (_store, session) = session();
    login(&session).await;

    session.logout().await.unwrap();
    session.logout().await.unwrap();
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn relogin_opens_fresh_listeners() {
    let (store, session) = session();
    login(&session).await;
    let first_feed = store.feed(Collection::Tasks);

    session.logout().await.unwrap();
    login(&session).await;

    // Old identity's feed is dead; the new one works.
    assert!(first_feed.send(Ok(Vec::new())).await.is_err());
    deliver(&store, &session, Collection::Tasks, vec![task_doc("t1", "Water plants")]).await;
    assert_eq!(session.tasks_snapshot().len(), 1);
}

#[tokio::test]
async fn delete_account_tears_the_session_down() {
    let (store, session) = session();
    login(&session).await;
    deliver(&store, &session, Collection::Tasks, vec![task_doc("t1", "Water plants")]).await;

    session.delete_account().await.unwrap();

    assert!(!session.is_authenticated());
    assert!(session.tasks_snapshot().is_empty());
    assert!(store.current_account().is_none());
}

// ── CRUD passthrough ────────────────────────────────────────────────

#[tokio::test]
async fn crud_requires_authentication() {
    let (_store, session) = session();

    let err = session.add_task("Water plants").await.unwrap_err();
    assert!(matches!(err, SyncError::NotSignedIn));
}

#[tokio::test]
async fn add_task_validates_name_and_sends_nothing() {
    let (store, session) = session();
    login(&session).await;

    let err = session.add_task("   ").await.unwrap_err();
    assert!(matches!(err, SyncError::Validation { field: "name", .. }));
    assert!(store.added().is_empty());
}

#[tokio::test]
async fn add_task_forwards_without_optimistic_cache_update() {
    let (store, session) = session();
    login(&session).await;

    session.add_task("Water plants").await.unwrap();

    // The write reached the store...
    let added = store.added();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].0, "tasks");
    assert_eq!(added[0].1["name"], "Water plants");

    // ...but the cache only changes when a snapshot arrives.
    assert!(session.tasks_snapshot().is_empty());

    deliver(&store, &session, Collection::Tasks, vec![task_doc("doc-1", "Water plants")]).await;
    assert_eq!(session.tasks_snapshot().len(), 1);
}

#[tokio::test]
async fn add_journal_entry_validates_content() {
    let (_store, session) = session();
    login(&session).await;

    let err = session.add_journal_entry("", None).await.unwrap_err();
    assert!(matches!(err, SyncError::Validation { field: "content", .. }));
}

#[tokio::test]
async fn toggling_a_task_patches_the_store() {
    let (store, session) = session();
    store.set_documents(Collection::Tasks, vec![task_doc("t1", "Water plants")]);
    login(&session).await;

    session
        .set_task_completed(&DocumentId::from("t1"), true)
        .await
        .unwrap();

    let docs = store
        .fetch(&UserId::from("user-1"), Collection::Tasks, None)
        .await
        .unwrap();
    assert_eq!(docs[0].data["completed"], true);
}
