// ── Session lifecycle and live synchronization ──
//
// `SyncSession` owns the authentication lifecycle and the three live
// mirrors (tasks, journal, plants). Each mirror is fed by its own
// subscription task; sign-out cancels and joins every mirror task before
// clearing the caches, so a late snapshot for a previous user can never
// be applied after logout.

use std::future::Future;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use potpal_api::{Account, Document, OrderBy, SnapshotListener};

use crate::config::SessionConfig;
use crate::convert::{
    journal_from_documents, journal_payload, plant_payload, plants_from_documents, reading_patch,
    task_completed_patch, task_payload, tasks_from_documents,
};
use crate::error::{AuthError, SyncError};
use crate::model::{DocumentId, JournalEntry, Plant, PlantDraft, SensorReading, TaskItem, UserId};
use crate::remote::{Collection, RemoteStore};
use crate::store::SessionCaches;
use crate::stream::ListStream;

/// The journal mirror requests server-side ordering on this field.
const JOURNAL_ORDER_FIELD: &str = "created_at";

// ── AuthState ───────────────────────────────────────────────────────

/// Authentication state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedOut,
    SignedIn { user: UserId, email: String },
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }
}

// ── SyncSession ─────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc` inner. One instance per process; construct
/// it explicitly and pass it to whatever needs it -- there is no ambient
/// global. The cached lists are owned exclusively by the session: external
/// callers read snapshots or invoke the CRUD passthrough, never mutate
/// directly.
pub struct SyncSession<S: RemoteStore> {
    inner: Arc<SessionInner<S>>,
}

impl<S: RemoteStore> Clone for SyncSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SessionInner<S> {
    store: S,
    config: SessionConfig,
    auth: watch::Sender<AuthState>,
    caches: Arc<SessionCaches>,
    mirrors: Mutex<Vec<MirrorHandle>>,
}

/// Handle to one running mirror task.
struct MirrorHandle {
    label: &'static str,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl<S: RemoteStore> SyncSession<S> {
    /// Create a session over a store client. Does NOT authenticate --
    /// call [`login`](Self::login) or [`register`](Self::register).
    pub fn new(store: S, config: SessionConfig) -> Self {
        let (auth, _) = watch::channel(AuthState::SignedOut);
        Self {
            inner: Arc::new(SessionInner {
                store,
                config,
                auth,
                caches: Arc::new(SessionCaches::new()),
                mirrors: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the underlying store client.
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    // ── Authentication lifecycle ─────────────────────────────────────

    /// Sign in and bring the three mirrors live.
    ///
    /// On failure the session stays signed out and no subscription is
    /// opened. On success any subscriptions from a previous identity are
    /// cancelled before the new ones start.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::InvalidFormat);
        }
        if password.expose_secret().is_empty() {
            return Err(AuthError::WrongSecret);
        }

        let account = self.inner.store.sign_in(email, password).await?;
        self.begin_session(account).await;
        Ok(())
    }

    /// Register a new account and bring the mirrors live.
    pub async fn register(&self, email: &str, password: &SecretString) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::InvalidFormat);
        }
        if password.expose_secret().len() < 6 {
            return Err(AuthError::WeakSecret);
        }

        let account = self.inner.store.sign_up(email, password).await?;
        self.begin_session(account).await;
        Ok(())
    }

    /// Sign out.
    ///
    /// Teardown is unconditional: whether or not the store call succeeds,
    /// every subscription is cancelled and joined and all three caches are
    /// cleared. A dangling listener after logout would leak data across
    /// accounts. Idempotent.
    pub async fn logout(&self) -> Result<(), SyncError> {
        let result = self.inner.store.sign_out();
        self.teardown().await;
        result.map_err(SyncError::from)
    }

    /// Permanently delete the signed-in account, then tear the session
    /// down. On failure the session is left untouched.
    pub async fn delete_account(&self) -> Result<(), SyncError> {
        self.require_user()?;
        self.inner.store.delete_account().await?;
        self.teardown().await;
        Ok(())
    }

    async fn begin_session(&self, account: Account) {
        let user = UserId::from(account.user_id);
        self.inner.auth.send_replace(AuthState::SignedIn {
            user: user.clone(),
            email: account.email,
        });
        info!(%user, "session active");

        // Initial load, then live subscriptions. A transient failure here
        // is not fatal: the mirrors fill in on the first delivery.
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "initial refresh failed");
        }
        self.start_subscriptions(&user).await;
    }

    async fn teardown(&self) {
        let mut mirrors = self.inner.mirrors.lock().await;
        shutdown_mirrors(&mut mirrors).await;
        self.inner.caches.clear_all();
        self.inner.auth.send_replace(AuthState::SignedOut);
        debug!("session torn down");
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to authentication state changes.
    pub fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.inner.auth.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.auth.borrow().is_authenticated()
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<UserId> {
        match &*self.inner.auth.borrow() {
            AuthState::SignedIn { user, .. } => Some(user.clone()),
            AuthState::SignedOut => None,
        }
    }

    // ── Mirror lifecycle ─────────────────────────────────────────────

    /// Fetch all three collections once and replace the mirrors.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        let user = self.require_user()?;
        let store = &self.inner.store;
        let journal_order = OrderBy::desc(JOURNAL_ORDER_FIELD);

        let (tasks, journal, plants) = tokio::join!(
            store.fetch(&user, Collection::Tasks, None),
            store.fetch(&user, Collection::Journal, Some(&journal_order)),
            store.fetch(&user, Collection::Plants, None),
        );

        let caches = &self.inner.caches;
        caches.tasks.apply(tasks_from_documents(tasks?));
        caches.journal.apply(journal_from_documents(journal?));
        caches.plants.apply(plants_from_documents(plants?));

        debug!(
            tasks = caches.tasks.len(),
            journal = caches.journal.len(),
            plants = caches.plants.len(),
            "refresh complete"
        );
        Ok(())
    }

    /// Open exactly one subscription per list type, cancelling any
    /// previous set first (no duplicate listeners).
    async fn start_subscriptions(&self, user: &UserId) {
        let mut mirrors = self.inner.mirrors.lock().await;
        shutdown_mirrors(&mut mirrors).await;

        let store = &self.inner.store;
        let interval = self.inner.config.poll_interval;
        let caches = &self.inner.caches;

        mirrors.push(spawn_mirror(
            "tasks",
            store.listen(user, Collection::Tasks, None, interval),
            Arc::clone(caches),
            |caches, docs| caches.tasks.apply(tasks_from_documents(docs)),
        ));
        mirrors.push(spawn_mirror(
            "journal",
            store.listen(
                user,
                Collection::Journal,
                Some(OrderBy::desc(JOURNAL_ORDER_FIELD)),
                interval,
            ),
            Arc::clone(caches),
            |caches, docs| caches.journal.apply(journal_from_documents(docs)),
        ));
        mirrors.push(spawn_mirror(
            "plants",
            store.listen(user, Collection::Plants, None, interval),
            Arc::clone(caches),
            |caches, docs| caches.plants.apply(plants_from_documents(docs)),
        ));
    }

    // ── CRUD passthrough ─────────────────────────────────────────────
    //
    // None of these mutate the caches: the mirror updates only when the
    // next snapshot arrives, so a failed call leaves nothing to roll back.

    pub async fn add_task(&self, name: &str) -> Result<(), SyncError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SyncError::Validation {
                field: "name",
                reason: "must not be empty",
            });
        }
        let user = self.require_user()?;
        self.inner
            .store
            .add(&user, Collection::Tasks, task_payload(name))
            .await?;
        Ok(())
    }

    pub async fn set_task_completed(
        &self,
        id: &DocumentId,
        completed: bool,
    ) -> Result<(), SyncError> {
        let user = self.require_user()?;
        self.inner
            .store
            .update(&user, Collection::Tasks, id, task_completed_patch(completed))
            .await?;
        Ok(())
    }

    pub async fn delete_task(&self, id: &DocumentId) -> Result<(), SyncError> {
        let user = self.require_user()?;
        self.inner.store.remove(&user, Collection::Tasks, id).await?;
        Ok(())
    }

    pub async fn add_journal_entry(
        &self,
        content: &str,
        plant_name: Option<&str>,
    ) -> Result<(), SyncError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(SyncError::Validation {
                field: "content",
                reason: "must not be empty",
            });
        }
        let user = self.require_user()?;
        self.inner
            .store
            .add(
                &user,
                Collection::Journal,
                journal_payload(content, plant_name, chrono::Utc::now()),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_journal_entry(&self, id: &DocumentId) -> Result<(), SyncError> {
        let user = self.require_user()?;
        self.inner
            .store
            .remove(&user, Collection::Journal, id)
            .await?;
        Ok(())
    }

    pub async fn add_plant(&self, draft: &PlantDraft) -> Result<(), SyncError> {
        if draft.name.trim().is_empty() {
            return Err(SyncError::Validation {
                field: "name",
                reason: "must not be empty",
            });
        }
        let user = self.require_user()?;
        self.inner
            .store
            .add(&user, Collection::Plants, plant_payload(draft))
            .await?;
        Ok(())
    }

    pub async fn update_plant(
        &self,
        id: &DocumentId,
        draft: &PlantDraft,
    ) -> Result<(), SyncError> {
        let user = self.require_user()?;
        self.inner
            .store
            .update(&user, Collection::Plants, id, plant_payload(draft))
            .await?;
        Ok(())
    }

    pub async fn delete_plant(&self, id: &DocumentId) -> Result<(), SyncError> {
        let user = self.require_user()?;
        self.inner
            .store
            .remove(&user, Collection::Plants, id)
            .await?;
        Ok(())
    }

    /// Store the latest pot sensor report on a plant.
    pub async fn record_sensor_reading(
        &self,
        id: &DocumentId,
        reading: &SensorReading,
    ) -> Result<(), SyncError> {
        let user = self.require_user()?;
        self.inner
            .store
            .update(&user, Collection::Plants, id, reading_patch(reading))
            .await?;
        Ok(())
    }

    // ── Snapshot accessors (delegate to the caches) ──────────────────

    pub fn tasks_snapshot(&self) -> Arc<Vec<Arc<TaskItem>>> {
        self.inner.caches.tasks_snapshot()
    }

    pub fn journal_snapshot(&self) -> Arc<Vec<Arc<JournalEntry>>> {
        self.inner.caches.journal_snapshot()
    }

    pub fn plants_snapshot(&self) -> Arc<Vec<Arc<Plant>>> {
        self.inner.caches.plants_snapshot()
    }

    // ── Stream accessors ─────────────────────────────────────────────

    pub fn tasks(&self) -> ListStream<TaskItem> {
        self.inner.caches.subscribe_tasks()
    }

    pub fn journal(&self) -> ListStream<JournalEntry> {
        self.inner.caches.subscribe_journal()
    }

    pub fn plants(&self) -> ListStream<Plant> {
        self.inner.caches.subscribe_plants()
    }

    // ── One-shot convenience ─────────────────────────────────────────

    /// One-shot: login, run closure, logout.
    ///
    /// Optimized for the CLI, where a session lives for a single command.
    pub async fn oneshot<F, Fut, T, E>(
        store: S,
        config: SessionConfig,
        email: &str,
        password: &SecretString,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce(SyncSession<S>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<AuthError>,
    {
        let session = SyncSession::new(store, config);
        session.login(email, password).await.map_err(E::from)?;
        let result = f(session.clone()).await;
        if let Err(e) = session.logout().await {
            warn!(error = %e, "logout failed (teardown still ran)");
        }
        result
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn require_user(&self) -> Result<UserId, SyncError> {
        self.current_user().ok_or(SyncError::NotSignedIn)
    }
}

// ── Mirror tasks ────────────────────────────────────────────────────

/// Spawn a task that folds snapshot deliveries into one cache list.
///
/// A delivery error is logged and skipped -- the previous snapshot stays
/// cached (retry belongs to the store client's listener). The task joins
/// its listener on the way out, so after `shutdown_mirrors` returns there
/// is no path left that could touch the caches.
fn spawn_mirror(
    label: &'static str,
    mut listener: SnapshotListener,
    caches: Arc<SessionCaches>,
    apply: fn(&SessionCaches, Vec<Document>),
) -> MirrorHandle {
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = task_cancel.cancelled() => break,
                delivery = listener.recv() => match delivery {
                    None => break, // subscription ended upstream
                    Some(Ok(docs)) => {
                        debug!(label, count = docs.len(), "applying snapshot");
                        apply(&caches, docs);
                    }
                    Some(Err(e)) => {
                        let err = SyncError::ListenerFailure(e.to_string());
                        warn!(label, %err, "keeping previous snapshot");
                    }
                },
            }
        }
        listener.shutdown().await;
    });

    MirrorHandle {
        label,
        cancel,
        task,
    }
}

/// Cancel and join every mirror task. Joining (not just cancelling) is
/// what guarantees no late snapshot can land after teardown.
async fn shutdown_mirrors(mirrors: &mut Vec<MirrorHandle>) {
    for mirror in mirrors.drain(..) {
        mirror.cancel.cancel();
        let _ = mirror.task.await;
        debug!(label = mirror.label, "mirror stopped");
    }
}
