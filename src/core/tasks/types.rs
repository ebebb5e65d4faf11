use crate::{
    core::{
        EntryId,
        TaskError,
        TemporaryWord,
        VocabularyEntry,
    },
    dictionary::DefinitionHit,
    store::Session,
};

#[derive(Debug, Clone)]
pub enum TaskResult {
    SignedIn(Result<Session, TaskError>),
    SignedOut,
    SessionRefreshed(Result<Session, TaskError>),

    /// `sequence` orders overlapping fetches; only the newest one should be applied.
    EntriesLoaded { sequence: u64, result: Result<Vec<VocabularyEntry>, TaskError> },
    TemporaryWordsLoaded { sequence: u64, result: Result<Vec<TemporaryWord>, TaskError> },

    EntryAdded(Result<(), TaskError>),
    EntryUpdated(Result<(), TaskError>),
    EntryDeleted(Result<(), TaskError>),
    FavoriteUpdated { id: EntryId, favorite: bool, result: Result<(), TaskError> },

    TemporaryWordAdded(Result<(), TaskError>),
    TemporaryWordDeleted(Result<(), TaskError>),

    DefinitionFetched { word: String, result: Result<Option<DefinitionHit>, TaskError> },
    ImportFinished(Result<usize, TaskError>),
}

impl TaskResult {
    pub fn task_type(&self) -> &'static str {
        match self {
            TaskResult::SignedIn(_) => "sign_in",
            TaskResult::SignedOut => "sign_out",
            TaskResult::SessionRefreshed(_) => "session_refreshed",
            TaskResult::EntriesLoaded { .. } => "entries_loaded",
            TaskResult::TemporaryWordsLoaded { .. } => "temporary_words_loaded",
            TaskResult::EntryAdded(_) => "entry_added",
            TaskResult::EntryUpdated(_) => "entry_updated",
            TaskResult::EntryDeleted(_) => "entry_deleted",
            TaskResult::FavoriteUpdated { .. } => "favorite_updated",
            TaskResult::TemporaryWordAdded(_) => "temporary_word_added",
            TaskResult::TemporaryWordDeleted(_) => "temporary_word_deleted",
            TaskResult::DefinitionFetched { .. } => "definition_fetched",
            TaskResult::ImportFinished(_) => "import_finished",
        }
    }
}
