use reqwest::{
    Client,
    Url,
};
use serde_json::Value;
use tracing::debug;

use crate::core::{
    models::DEFAULT_PART_OF_SPEECH,
    StoreError,
};

pub const DICTIONARY_API_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionHit {
    pub definition: String,
    pub part_of_speech: String,
}

/// Free English dictionary used to pre-fill the add-word form.
pub struct DictionaryClient {
    client: Client,
    base_url: Url,
}

impl DictionaryClient {
    pub fn new() -> Result<Self, StoreError> {
        Self::with_base_url(DICTIONARY_API_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Decode(format!("Invalid dictionary URL: {e}")))?;
        Ok(Self { client: crate::store::api::http_client()?, base_url })
    }

    fn word_url(&self, word: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Decode("Dictionary URL cannot take a path".to_string()))?
            .pop_if_empty()
            .push(word.trim());
        Ok(url)
    }

    /// Looks a word up. `Ok(None)` means the dictionary has no entry for it.
    pub async fn lookup(&self, word: &str) -> Result<Option<DefinitionHit>, StoreError> {
        let url = self.word_url(word)?;
        debug!("Looking up definition: {}", url);

        // Unknown words come back as 404 with an error object, which reads as no hit.
        let body: Value = self.client.get(url).send().await?.json().await?;
        Ok(first_definition(&body))
    }
}

/// First definition of the first meaning, with that meaning's part of speech.
pub fn first_definition(body: &Value) -> Option<DefinitionHit> {
    let entry = body.as_array()?.first()?;
    let meaning = entry.get("meanings").and_then(Value::as_array).and_then(|m| m.first());

    let definition = meaning
        .and_then(|m| m.get("definitions"))
        .and_then(Value::as_array)
        .and_then(|d| d.first())
        .and_then(|d| d.get("definition"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let part_of_speech = meaning
        .and_then(|m| m.get("partOfSpeech"))
        .and_then(Value::as_str)
        .filter(|pos| !pos.is_empty())
        .unwrap_or(DEFAULT_PART_OF_SPEECH)
        .to_string();

    Some(DefinitionHit { definition, part_of_speech })
}
