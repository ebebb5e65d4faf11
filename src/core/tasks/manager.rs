use std::{
    future::Future,
    sync::{
        mpsc,
        Arc,
    },
    thread,
};

use tokio::runtime::Runtime;
use tracing::{
    debug,
    warn,
};

use super::TaskResult;
use crate::{
    backup,
    core::{
        EntryId,
        EntryPatch,
        NewVocabularyEntry,
        TaskError,
        UserId,
        VocabookError,
    },
    deck::FavoriteToggle,
    dictionary::DictionaryClient,
    store::{
        AuthClient,
        BackendConfig,
        Session,
        VocabularyStore,
    },
};

type Waker = Arc<dyn Fn() + Send + Sync>;

/// A result tagged with the session generation that was current when its task was spawned.
#[derive(Debug)]
struct Stamped {
    generation: u64,
    result: TaskResult,
}

#[derive(Clone)]
struct TaskSender {
    generation: u64,
    sender: mpsc::Sender<Stamped>,
    waker: Option<Waker>,
}

impl TaskSender {
    fn send(&self, result: TaskResult) {
        debug!("Task finished: {}", result.task_type());
        if self.sender.send(Stamped { generation: self.generation, result }).is_ok() {
            if let Some(waker) = &self.waker {
                waker();
            }
        }
    }
}

/// Runs network calls off the UI thread and hands the results back over a channel.
///
/// Every signed-in session is a new generation. Results of tasks spawned under an older
/// generation never reach `poll_results`.
pub struct TaskManager {
    runtime: Arc<Runtime>,
    receiver: mpsc::Receiver<Stamped>,
    sender: mpsc::Sender<Stamped>,
    waker: Option<Waker>,
    generation: u64,
}

impl TaskManager {
    pub fn new() -> Result<Self, VocabookError> {
        let runtime = Arc::new(Runtime::new()?);

        let (sender, receiver) = mpsc::channel();

        Ok(Self { runtime, receiver, sender, waker: None, generation: 0 })
    }

    /// Called after every delivered result, e.g. to request a repaint.
    pub fn set_waker(&mut self, waker: impl Fn() + Send + Sync + 'static) {
        self.waker = Some(Arc::new(waker));
    }

    /// Starts a new generation. Tasks still in flight will have their results discarded.
    pub fn begin_generation(&mut self) -> u64 {
        self.generation += 1;
        debug!("Task generation {}", self.generation);
        self.generation
    }

    pub fn poll_results(&mut self) -> Vec<TaskResult> {
        let mut results = Vec::new();

        while let Ok(stamped) = self.receiver.try_recv() {
            if let Some(result) = self.accept(stamped) {
                results.push(result);
            }
        }

        results
    }

    fn accept(&self, stamped: Stamped) -> Option<TaskResult> {
        if stamped.generation != self.generation {
            debug!(
                "Dropping {} from generation {} (current {})",
                stamped.result.task_type(),
                stamped.generation,
                self.generation
            );
            return None;
        }
        Some(stamped.result)
    }

    fn task_context(&self) -> (TaskSender, Arc<Runtime>) {
        let sender = TaskSender {
            generation: self.generation,
            sender: self.sender.clone(),
            waker: self.waker.clone(),
        };
        (sender, self.runtime.clone())
    }

    fn spawn<F, Fut>(&self, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult>,
    {
        let (sender, runtime) = self.task_context();

        thread::spawn(move || {
            let result = runtime.block_on(task());
            sender.send(result);
        });
    }

    pub fn sign_in(&self, config: BackendConfig, email: String, password: String) {
        self.spawn(move || async move {
            let result = match AuthClient::new(config) {
                Ok(auth) => auth.sign_in(&email, &password).await,
                Err(e) => Err(e),
            };
            TaskResult::SignedIn(result.map_err(TaskError::from))
        });
    }

    /// Renews the access token. A rejected refresh token comes back as `SessionExpired`.
    pub fn refresh_session(&self, config: BackendConfig, session: Session) {
        self.spawn(move || async move {
            let result = match AuthClient::new(config) {
                Ok(auth) => auth.refresh(&session).await,
                Err(e) => Err(e),
            };
            TaskResult::SessionRefreshed(result.map_err(TaskError::from))
        });
    }

    pub fn sign_out(&self, config: BackendConfig, session: Session) {
        self.spawn(move || async move {
            if let Ok(auth) = AuthClient::new(config) {
                if let Err(e) = auth.sign_out(&session).await {
                    warn!("Sign-out request failed: {}", e);
                }
            }
            TaskResult::SignedOut
        });
    }

    pub fn fetch_entries<S>(&self, store: Arc<S>, user: UserId, sequence: u64)
    where
        S: VocabularyStore + Send + Sync + 'static,
    {
        self.spawn(move || async move {
            let result = store.fetch_entries(&user).await.map_err(TaskError::from);
            TaskResult::EntriesLoaded { sequence, result }
        });
    }

    pub fn fetch_temporary_words<S>(&self, store: Arc<S>, user: UserId, sequence: u64)
    where
        S: VocabularyStore + Send + Sync + 'static,
    {
        self.spawn(move || async move {
            let result = store.fetch_temporary_words(&user).await.map_err(TaskError::from);
            TaskResult::TemporaryWordsLoaded { sequence, result }
        });
    }

    pub fn add_entry<S>(&self, store: Arc<S>, user: UserId, entry: NewVocabularyEntry)
    where
        S: VocabularyStore + Send + Sync + 'static,
    {
        self.spawn(move || async move {
            let result = store.insert_entry(&user, &entry).await.map_err(TaskError::from);
            TaskResult::EntryAdded(result)
        });
    }

    pub fn update_entry<S>(&self, store: Arc<S>, id: EntryId, patch: EntryPatch)
    where
        S: VocabularyStore + Send + Sync + 'static,
    {
        self.spawn(move || async move {
            let result = store.update_entry(&id, &patch).await.map_err(TaskError::from);
            TaskResult::EntryUpdated(result)
        });
    }

    /// Forwards an optimistic favorite toggle. The local flag is never rolled back here.
    pub fn update_favorite<S>(&self, store: Arc<S>, toggle: FavoriteToggle)
    where
        S: VocabularyStore + Send + Sync + 'static,
    {
        self.spawn(move || async move {
            let result =
                store.update_entry(&toggle.id, &toggle.patch()).await.map_err(TaskError::from);
            TaskResult::FavoriteUpdated { id: toggle.id, favorite: toggle.favorite, result }
        });
    }

    pub fn delete_entry<S>(&self, store: Arc<S>, id: EntryId)
    where
        S: VocabularyStore + Send + Sync + 'static,
    {
        self.spawn(move || async move {
            let result = store.delete_entry(&id).await.map_err(TaskError::from);
            TaskResult::EntryDeleted(result)
        });
    }

    pub fn add_temporary_word<S>(&self, store: Arc<S>, user: UserId, word: String)
    where
        S: VocabularyStore + Send + Sync + 'static,
    {
        self.spawn(move || async move {
            let result = store.insert_temporary_word(&user, &word).await.map_err(TaskError::from);
            TaskResult::TemporaryWordAdded(result)
        });
    }

    pub fn delete_temporary_word<S>(&self, store: Arc<S>, id: EntryId)
    where
        S: VocabularyStore + Send + Sync + 'static,
    {
        self.spawn(move || async move {
            let result = store.delete_temporary_word(&id).await.map_err(TaskError::from);
            TaskResult::TemporaryWordDeleted(result)
        });
    }

    pub fn lookup_definition(&self, word: String) {
        self.spawn(move || async move {
            let result = match DictionaryClient::new() {
                Ok(client) => client.lookup(&word).await,
                Err(e) => Err(e),
            };
            TaskResult::DefinitionFetched { word, result: result.map_err(TaskError::from) }
        });
    }

    pub fn import_entries<S>(&self, store: Arc<S>, user: UserId, items: Vec<NewVocabularyEntry>)
    where
        S: VocabularyStore + Send + Sync + 'static,
    {
        self.spawn(move || async move {
            let result = backup::import_entries(store.as_ref(), &user, &items)
                .await
                .map_err(TaskError::from);
            TaskResult::ImportFinished(result)
        });
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{
            AtomicUsize,
            Ordering,
        },
        time::Duration,
    };

    use super::*;
    use crate::store::InMemoryStore;

    const WAIT: Duration = Duration::from_secs(5);

    fn next_result(manager: &TaskManager) -> TaskResult {
        manager.receiver.recv_timeout(WAIT).expect("task did not report back").result
    }

    #[test]
    fn fetch_reports_entries_and_wakes() {
        let mut manager = TaskManager::new().unwrap();
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = wakes.clone();
        manager.set_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let store = Arc::new(InMemoryStore::new());
        let user = UserId::new("u");
        manager.add_entry(store.clone(), user.clone(), NewVocabularyEntry::with_term("gleam"));
        assert!(matches!(next_result(&manager), TaskResult::EntryAdded(Ok(()))));

        manager.fetch_entries(store, user, 7);
        match next_result(&manager) {
            TaskResult::EntriesLoaded { sequence: 7, result: Ok(entries) } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].term, "gleam");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert_eq!(wakes.load(Ordering::SeqCst), 2);
        assert!(manager.poll_results().is_empty());
    }

    #[test]
    fn failed_favorite_update_carries_error() {
        let manager = TaskManager::new().unwrap();
        let store = Arc::new(InMemoryStore::new());
        store.set_unavailable(true);

        let toggle = FavoriteToggle { id: EntryId::new("a"), favorite: true };
        manager.update_favorite(store, toggle);

        match next_result(&manager) {
            TaskResult::FavoriteUpdated { id, favorite, result } => {
                assert_eq!(id, EntryId::new("a"));
                assert!(favorite);
                assert!(matches!(result, Err(TaskError::Failed(_))));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn import_reports_count() {
        let manager = TaskManager::new().unwrap();
        let store = Arc::new(InMemoryStore::new());
        let items = vec![NewVocabularyEntry::with_term("a"), NewVocabularyEntry::with_term("b")];

        manager.import_entries(store.clone(), UserId::new("u"), items);
        assert!(matches!(next_result(&manager), TaskResult::ImportFinished(Ok(2))));
        assert_eq!(store.entry_count(), 2);
    }

    #[test]
    fn expired_session_is_reported_as_such() {
        let manager = TaskManager::new().unwrap();
        let store = Arc::new(InMemoryStore::new());
        store.set_session_expired(true);

        manager.fetch_entries(store, UserId::new("u"), 1);
        match next_result(&manager) {
            TaskResult::EntriesLoaded { result: Err(e), .. } => assert!(e.is_session_expired()),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn results_from_an_earlier_generation_are_dropped() {
        let mut manager = TaskManager::new().unwrap();
        let store = Arc::new(InMemoryStore::new());
        manager.fetch_entries(store.clone(), UserId::new("alice"), 1);
        let stale = manager.receiver.recv_timeout(WAIT).unwrap();
        assert_eq!(stale.generation, 0);

        manager.begin_generation();
        assert!(manager.accept(stale).is_none());

        manager.fetch_entries(store, UserId::new("bob"), 1);
        let fresh = manager.receiver.recv_timeout(WAIT).unwrap();
        assert!(matches!(
            manager.accept(fresh),
            Some(TaskResult::EntriesLoaded { result: Ok(_), .. })
        ));
    }

    #[test]
    fn poll_skips_results_spawned_before_sign_out() {
        let mut manager = TaskManager::new().unwrap();
        let (wake_tx, wake_rx) = mpsc::channel();
        manager.set_waker(move || {
            let _ = wake_tx.send(());
        });

        let store = Arc::new(InMemoryStore::new());
        manager.fetch_entries(store, UserId::new("alice"), 1);
        wake_rx.recv_timeout(WAIT).expect("task did not report back");

        manager.begin_generation();
        assert!(manager.poll_results().is_empty());
    }
}
