use super::top_bar::Tab;
use crate::core::{
    EntryId,
    EntryPatch,
    NewVocabularyEntry,
    TemporaryWord,
};

// Views push actions here so they only need shared references to app state
#[derive(Debug, Clone)]
pub enum UiAction {
    // Session
    SignIn { email: String, password: String },
    SignOut,
    OpenSettings,
    SelectTab(Tab),

    // Add Words
    AddEntry(NewVocabularyEntry),
    AddTemporaryWord(String),
    UseTemporaryWord(TemporaryWord),
    DeleteTemporaryWord(EntryId),
    LookupDefinition(String),

    // Vocabulary Table
    UpdateEntry { id: EntryId, patch: EntryPatch },
    SetFavorite { id: EntryId, favorite: bool },
    DeleteEntry(EntryId),

    // Review
    FlipCard,
    NextCard,
    ToggleCardFavorite,

    // Backup
    ExportBackup,
    PickImportFile,
    ConfirmImport(Vec<NewVocabularyEntry>),
}

pub struct ActionQueue {
    actions: Vec<UiAction>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self { actions: Vec::new() }
    }

    pub fn push(&mut self, action: UiAction) {
        self.actions.push(action);
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, UiAction> {
        self.actions.drain(..)
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new()
    }
}
