//! Access to the hosted backend: vocabulary rows, temporary words and sign-in.

pub mod api;
pub mod auth;
mod memory;

pub use api::{
    BackendConfig,
    RestStore,
};
pub use auth::{
    AuthClient,
    Session,
};
pub use memory::InMemoryStore;

use crate::core::{
    EntryId,
    EntryPatch,
    NewVocabularyEntry,
    StoreError,
    TemporaryWord,
    UserId,
    VocabularyEntry,
};

/// Query/mutate interface of the entry store. Every call names the user it acts for.
#[allow(async_fn_in_trait)]
pub trait VocabularyStore {
    /// All entries of the user, newest first.
    async fn fetch_entries(&self, user: &UserId) -> Result<Vec<VocabularyEntry>, StoreError>;

    async fn insert_entries(
        &self,
        user: &UserId,
        entries: &[NewVocabularyEntry],
    ) -> Result<(), StoreError>;

    async fn insert_entry(
        &self,
        user: &UserId,
        entry: &NewVocabularyEntry,
    ) -> Result<(), StoreError> {
        self.insert_entries(user, std::slice::from_ref(entry)).await
    }

    async fn update_entry(&self, id: &EntryId, patch: &EntryPatch) -> Result<(), StoreError>;

    async fn delete_entry(&self, id: &EntryId) -> Result<(), StoreError>;

    /// Parked words of the user, newest first.
    async fn fetch_temporary_words(&self, user: &UserId)
        -> Result<Vec<TemporaryWord>, StoreError>;

    async fn insert_temporary_word(&self, user: &UserId, word: &str) -> Result<(), StoreError>;

    async fn delete_temporary_word(&self, id: &EntryId) -> Result<(), StoreError>;
}
