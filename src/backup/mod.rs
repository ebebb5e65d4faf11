//! JSON backup files: `{ version, date, items }`.
//!
//! Export writes every entry as stored. Import strips the store-assigned fields
//! (`id`, `created_at`, `user_id`) and resubmits the rest as new entries, so
//! importing the same file twice produces duplicates.

use std::{
    fs,
    path::Path,
};

use chrono::{
    DateTime,
    NaiveDate,
    SecondsFormat,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;
use tracing::info;

use crate::{
    core::{
        NewVocabularyEntry,
        UserId,
        VocabookError,
        VocabularyEntry,
    },
    store::VocabularyStore,
};

pub const BACKUP_VERSION: &str = "2.0";

const STORE_ASSIGNED_FIELDS: &[&str] = &["id", "created_at", "user_id"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupFile {
    pub version: String,
    pub date: String,
    pub items: Vec<VocabularyEntry>,
}

impl BackupFile {
    pub fn new(entries: &[VocabularyEntry], date: DateTime<Utc>) -> Self {
        Self {
            version: BACKUP_VERSION.to_string(),
            date: date.to_rfc3339_opts(SecondsFormat::Millis, true),
            items: entries.to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String, VocabookError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn backup_file_name(date: NaiveDate) -> String {
    format!("vocab_backup_{}.json", date.format("%Y-%m-%d"))
}

pub fn export_to_file(
    entries: &[VocabularyEntry],
    date: DateTime<Utc>,
    path: &Path,
) -> Result<(), VocabookError> {
    let json = BackupFile::new(entries, date).to_json()?;
    fs::write(path, json)?;
    info!("Exported {} entries to {}", entries.len(), path.display());
    Ok(())
}

/// Parses a backup document into entries ready for insertion.
///
/// A document without an `items` array yields nothing. Every item must be a JSON
/// object with a non-empty word; otherwise the whole import is rejected.
pub fn parse_import(text: &str) -> Result<Vec<NewVocabularyEntry>, VocabookError> {
    let document: Value = serde_json::from_str(text)
        .map_err(|e| VocabookError::Parse(format!("not valid JSON ({e})")))?;

    let Some(items) = document.get("items").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let Value::Object(fields) = item else {
                return Err(VocabookError::Parse(format!("item {index} is not an object")));
            };

            let mut fields = fields.clone();
            for key in STORE_ASSIGNED_FIELDS {
                fields.remove(*key);
            }

            let entry: NewVocabularyEntry = serde_json::from_value(Value::Object(fields))
                .map_err(|e| VocabookError::Parse(format!("item {index}: {e}")))?;
            entry
                .validate()
                .map_err(|e| VocabookError::Parse(format!("item {index}: {e}")))?;
            Ok(entry)
        })
        .collect()
}

pub fn read_import_file(path: &Path) -> Result<Vec<NewVocabularyEntry>, VocabookError> {
    let text = fs::read_to_string(path)?;
    parse_import(&text)
}

/// Submits parsed items as new entries in one batch. Returns how many were sent.
pub async fn import_entries<S: VocabularyStore>(
    store: &S,
    user: &UserId,
    items: &[NewVocabularyEntry],
) -> Result<usize, VocabookError> {
    if items.is_empty() {
        return Ok(0);
    }

    store.insert_entries(user, items).await?;
    info!("Imported {} entries", items.len());
    Ok(items.len())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        core::EntryId,
        store::InMemoryStore,
    };

    fn stored_entry(id: &str, term: &str) -> VocabularyEntry {
        VocabularyEntry {
            id: EntryId::new(id),
            user_id: Some(UserId::new("owner")),
            term: term.to_string(),
            definition: format!("meaning of {term}"),
            translation: "译".to_string(),
            notes: String::new(),
            part_of_speech: "verb".to_string(),
            favorite: true,
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
        }
    }

    #[test]
    fn export_document_shape() {
        let date = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let json = BackupFile::new(&[stored_entry("1", "run")], date).to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], "2.0");
        assert_eq!(value["date"], "2024-05-06T07:08:09.000Z");
        assert_eq!(value["items"][0]["word"], "run");
        assert_eq!(value["items"][0]["star"], true);
        assert_eq!(value["items"][0]["id"], "1");
        assert!(json.contains("\n  \"version\""));
        assert_eq!(
            backup_file_name(date.date_naive()),
            "vocab_backup_2024-05-06.json"
        );
    }

    #[test]
    fn import_strips_store_fields() {
        let date = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let json = BackupFile::new(&[stored_entry("1", "run"), stored_entry("2", "walk")], date)
            .to_json()
            .unwrap();

        let items = parse_import(&json).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], stored_entry("1", "run").to_new_entry());
    }

    #[test]
    fn missing_items_means_nothing_to_import() {
        assert!(parse_import(r#"{"version":"2.0"}"#).unwrap().is_empty());
        assert!(parse_import(r#"{"items":"nope"}"#).unwrap().is_empty());
        assert!(parse_import("42").unwrap().is_empty());
    }

    #[test]
    fn malformed_files_are_rejected() {
        assert!(matches!(parse_import("{not json"), Err(VocabookError::Parse(_))));
        assert!(matches!(parse_import(r#"{"items":[1]}"#), Err(VocabookError::Parse(_))));
        assert!(matches!(
            parse_import(r#"{"items":[{"word":"ok"},{"meaning":"no word"}]}"#),
            Err(VocabookError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn reimport_duplicates_entries() {
        let store = InMemoryStore::new();
        let user = UserId::new("me");
        let originals: Vec<NewVocabularyEntry> = (0..5)
            .map(|i| NewVocabularyEntry::with_term(format!("word {i}")))
            .collect();
        store.insert_entries(&user, &originals).await.unwrap();

        let existing = store.fetch_entries(&user).await.unwrap();
        let json = BackupFile::new(&existing, Utc::now()).to_json().unwrap();
        let items = parse_import(&json).unwrap();

        let imported = import_entries(&store, &user, &items).await.unwrap();
        assert_eq!(imported, 5);
        assert_eq!(store.fetch_entries(&user).await.unwrap().len(), 10);
    }

    #[test]
    fn failed_parse_submits_nothing() {
        let store = InMemoryStore::new();
        let result = parse_import(r#"{"items":[{"word":"a"}, "b"]}"#);
        assert!(result.is_err());
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_store_error() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        let items = vec![NewVocabularyEntry::with_term("x")];

        let result = import_entries(&store, &UserId::new("me"), &items).await;
        assert!(matches!(result, Err(VocabookError::Store(_))));
    }
}
