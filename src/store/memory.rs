use std::sync::{
    Mutex,
    MutexGuard,
    PoisonError,
};

use chrono::Utc;
use uuid::Uuid;

use super::VocabularyStore;
use crate::core::{
    EntryId,
    EntryPatch,
    NewVocabularyEntry,
    StoreError,
    TemporaryWord,
    UserId,
    VocabularyEntry,
};

#[derive(Default)]
struct MemoryState {
    entries: Vec<VocabularyEntry>,
    temporary_words: Vec<TemporaryWord>,
    unavailable: bool,
    session_expired: bool,
}

/// Process-local store with the same semantics as the REST backend.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn available(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let state = self.state();
        if state.session_expired {
            return Err(StoreError::Unauthenticated);
        }
        if state.unavailable {
            return Err(StoreError::Status {
                status: 503,
                message: "store unavailable".to_string(),
            });
        }
        Ok(state)
    }

    /// Adds entries with their ids as given, owned by `user`.
    pub fn seed(&self, user: &UserId, entries: Vec<VocabularyEntry>) {
        let mut state = self.state();
        for mut entry in entries {
            entry.user_id = Some(user.clone());
            state.entries.push(entry);
        }
    }

    /// Makes every following call fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    /// Rejects every following call as unauthenticated, like an expired access token.
    pub fn set_session_expired(&self, expired: bool) {
        self.state().session_expired = expired;
    }

    pub fn entry_count(&self) -> usize {
        self.state().entries.len()
    }
}

fn owned_by(owner: &Option<UserId>, user: &UserId) -> bool {
    owner.as_ref() == Some(user)
}

impl VocabularyStore for InMemoryStore {
    async fn fetch_entries(&self, user: &UserId) -> Result<Vec<VocabularyEntry>, StoreError> {
        let state = self.available()?;
        let mut entries: Vec<VocabularyEntry> =
            state.entries.iter().rev().filter(|e| owned_by(&e.user_id, user)).cloned().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn insert_entries(
        &self,
        user: &UserId,
        entries: &[NewVocabularyEntry],
    ) -> Result<(), StoreError> {
        let mut state = self.available()?;
        for entry in entries {
            state.entries.push(VocabularyEntry {
                id: EntryId::new(Uuid::new_v4().to_string()),
                user_id: Some(user.clone()),
                term: entry.term.clone(),
                definition: entry.definition.clone(),
                translation: entry.translation.clone(),
                notes: entry.notes.clone(),
                part_of_speech: entry.part_of_speech.clone(),
                favorite: entry.favorite,
                created_at: Some(Utc::now()),
            });
        }
        Ok(())
    }

    async fn update_entry(&self, id: &EntryId, patch: &EntryPatch) -> Result<(), StoreError> {
        let mut state = self.available()?;
        if let Some(entry) = state.entries.iter_mut().find(|e| e.id == *id) {
            patch.apply_to(entry);
        }
        Ok(())
    }

    async fn delete_entry(&self, id: &EntryId) -> Result<(), StoreError> {
        let mut state = self.available()?;
        state.entries.retain(|e| e.id != *id);
        Ok(())
    }

    async fn fetch_temporary_words(
        &self,
        user: &UserId,
    ) -> Result<Vec<TemporaryWord>, StoreError> {
        let state = self.available()?;
        let mut words: Vec<TemporaryWord> = state
            .temporary_words
            .iter()
            .rev()
            .filter(|w| owned_by(&w.user_id, user))
            .cloned()
            .collect();
        words.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(words)
    }

    async fn insert_temporary_word(&self, user: &UserId, word: &str) -> Result<(), StoreError> {
        let mut state = self.available()?;
        state.temporary_words.push(TemporaryWord {
            id: EntryId::new(Uuid::new_v4().to_string()),
            user_id: Some(user.clone()),
            word: word.to_string(),
            created_at: Some(Utc::now()),
        });
        Ok(())
    }

    async fn delete_temporary_word(&self, id: &EntryId) -> Result<(), StoreError> {
        let mut state = self.available()?;
        state.temporary_words.retain(|w| w.id != *id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entries_are_scoped_to_their_user() {
        let store = InMemoryStore::new();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        store.insert_entry(&alice, &NewVocabularyEntry::with_term("apple")).await.unwrap();
        store.insert_entry(&bob, &NewVocabularyEntry::with_term("banana")).await.unwrap();

        let alice_entries = store.fetch_entries(&alice).await.unwrap();
        assert_eq!(alice_entries.len(), 1);
        assert_eq!(alice_entries[0].term, "apple");
        assert_eq!(alice_entries[0].user_id, Some(alice.clone()));
    }

    #[tokio::test]
    async fn update_and_delete_by_id() {
        let store = InMemoryStore::new();
        let user = UserId::new("u");
        store.insert_entry(&user, &NewVocabularyEntry::with_term("old")).await.unwrap();
        let id = store.fetch_entries(&user).await.unwrap()[0].id.clone();

        let patch = EntryPatch { term: Some("new".to_string()), ..EntryPatch::default() };
        store.update_entry(&id, &patch).await.unwrap();
        let entries = store.fetch_entries(&user).await.unwrap();
        assert_eq!(entries[0].term, "new");
        assert_eq!(entries[0].part_of_speech, "noun");

        store.delete_entry(&id).await.unwrap();
        assert!(store.fetch_entries(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn temporary_words_newest_first() {
        let store = InMemoryStore::new();
        let user = UserId::new("u");
        store.insert_temporary_word(&user, "first").await.unwrap();
        store.insert_temporary_word(&user, "second").await.unwrap();

        let words = store.fetch_temporary_words(&user).await.unwrap();
        let words: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn unavailable_store_reports_errors() {
        let store = InMemoryStore::new();
        let user = UserId::new("u");
        store.set_unavailable(true);

        let result = store.fetch_entries(&user).await;
        assert!(matches!(result, Err(StoreError::Status { status: 503, .. })));

        store.set_unavailable(false);
        assert!(store.fetch_entries(&user).await.is_ok());
    }

    #[tokio::test]
    async fn expired_session_rejects_calls() {
        let store = InMemoryStore::new();
        let user = UserId::new("u");
        store.set_session_expired(true);

        let result = store.insert_temporary_word(&user, "late").await;
        assert!(matches!(result, Err(StoreError::Unauthenticated)));
        assert_eq!(store.entry_count(), 0);
    }
}
