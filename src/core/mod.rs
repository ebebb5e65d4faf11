pub mod errors;
pub mod models;
pub mod tasks;
pub mod utils;

pub use errors::{
    StoreError,
    TaskError,
    VocabookError,
};
pub use models::{
    EntryId,
    EntryPatch,
    NewVocabularyEntry,
    TemporaryWord,
    UserId,
    VocabularyEntry,
};
