use std::fmt;

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};

use super::VocabookError;

pub const DEFAULT_PART_OF_SPEECH: &str = "noun";

pub const PARTS_OF_SPEECH: &[&str] = &["noun", "verb", "adjective", "adverb", "idiom", "phrase"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Nullable text columns come back as `null`; treat them as empty strings.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_part_of_speech() -> String {
    DEFAULT_PART_OF_SPEECH.to_string()
}

fn null_as_part_of_speech<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|pos| !pos.trim().is_empty())
        .unwrap_or_else(default_part_of_speech))
}

/// A row of the `vocabulary` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: EntryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(rename = "word")]
    pub term: String,
    #[serde(rename = "meaning", default, deserialize_with = "null_as_default")]
    pub definition: String,
    #[serde(rename = "chinese", default, deserialize_with = "null_as_default")]
    pub translation: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(rename = "pos", default, deserialize_with = "null_as_default")]
    pub part_of_speech: String,
    #[serde(rename = "star", default, deserialize_with = "null_as_default")]
    pub favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl VocabularyEntry {
    pub fn to_new_entry(&self) -> NewVocabularyEntry {
        NewVocabularyEntry {
            term: self.term.clone(),
            definition: self.definition.clone(),
            translation: self.translation.clone(),
            notes: self.notes.clone(),
            part_of_speech: self.part_of_speech.clone(),
            favorite: self.favorite,
        }
    }
}

/// An entry that has not been stored yet. The store assigns `id`, `created_at` and `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVocabularyEntry {
    #[serde(rename = "word", default, deserialize_with = "null_as_default")]
    pub term: String,
    #[serde(rename = "meaning", default, deserialize_with = "null_as_default")]
    pub definition: String,
    #[serde(rename = "chinese", default, deserialize_with = "null_as_default")]
    pub translation: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(
        rename = "pos",
        default = "default_part_of_speech",
        deserialize_with = "null_as_part_of_speech"
    )]
    pub part_of_speech: String,
    #[serde(rename = "star", default, deserialize_with = "null_as_default")]
    pub favorite: bool,
}

impl Default for NewVocabularyEntry {
    fn default() -> Self {
        Self {
            term: String::new(),
            definition: String::new(),
            translation: String::new(),
            notes: String::new(),
            part_of_speech: default_part_of_speech(),
            favorite: false,
        }
    }
}

impl NewVocabularyEntry {
    pub fn with_term(term: impl Into<String>) -> Self {
        Self { term: term.into(), ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), VocabookError> {
        if self.term.trim().is_empty() {
            return Err(VocabookError::Validation("A word is required".to_string()));
        }
        Ok(())
    }
}

/// Partial update of a stored entry. Only the fields that are set get sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntryPatch {
    #[serde(rename = "word", skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(rename = "meaning", skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(rename = "chinese", skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "pos", skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(rename = "star", skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
}

impl EntryPatch {
    pub fn favorite(favorite: bool) -> Self {
        Self { favorite: Some(favorite), ..Self::default() }
    }

    /// The text fields editable from the vocabulary table.
    pub fn edited_fields(entry: &VocabularyEntry) -> Self {
        Self {
            term: Some(entry.term.clone()),
            definition: Some(entry.definition.clone()),
            translation: Some(entry.translation.clone()),
            notes: Some(entry.notes.clone()),
            part_of_speech: Some(entry.part_of_speech.clone()),
            favorite: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, entry: &mut VocabularyEntry) {
        if let Some(term) = &self.term {
            entry.term = term.clone();
        }
        if let Some(definition) = &self.definition {
            entry.definition = definition.clone();
        }
        if let Some(translation) = &self.translation {
            entry.translation = translation.clone();
        }
        if let Some(notes) = &self.notes {
            entry.notes = notes.clone();
        }
        if let Some(part_of_speech) = &self.part_of_speech {
            entry.part_of_speech = part_of_speech.clone();
        }
        if let Some(favorite) = self.favorite {
            entry.favorite = favorite;
        }
    }
}

/// A bare word parked for later, without a definition yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporaryWord {
    pub id: EntryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_reads_backend_row() {
        let row = serde_json::json!({
            "id": "6c1f",
            "user_id": "u-1",
            "word": "serendipity",
            "meaning": "a happy accident",
            "chinese": null,
            "notes": "",
            "pos": "noun",
            "star": true,
            "created_at": "2024-03-01T10:20:30.123456+00:00"
        });

        let entry: VocabularyEntry = serde_json::from_value(row).unwrap();
        assert_eq!(entry.id.as_str(), "6c1f");
        assert_eq!(entry.term, "serendipity");
        assert_eq!(entry.translation, "");
        assert!(entry.favorite);
        assert!(entry.created_at.is_some());
    }

    #[test]
    fn new_entry_defaults_and_validation() {
        let entry: NewVocabularyEntry =
            serde_json::from_value(serde_json::json!({ "word": "ephemeral" })).unwrap();
        assert_eq!(entry.part_of_speech, "noun");
        assert!(!entry.favorite);
        assert!(entry.validate().is_ok());

        let null_pos: NewVocabularyEntry =
            serde_json::from_value(serde_json::json!({ "word": "x", "pos": null })).unwrap();
        assert_eq!(null_pos.part_of_speech, "noun");

        let blank = NewVocabularyEntry::with_term("   ");
        assert!(matches!(blank.validate(), Err(VocabookError::Validation(_))));
    }

    #[test]
    fn patch_only_serializes_set_fields() {
        let json = serde_json::to_value(EntryPatch::favorite(true)).unwrap();
        assert_eq!(json, serde_json::json!({ "star": true }));
        assert!(EntryPatch::default().is_empty());
    }
}
