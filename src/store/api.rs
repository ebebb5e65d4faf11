use std::time::Duration;

use reqwest::{
    Client,
    RequestBuilder,
    Response,
};
use serde::{
    de::DeserializeOwned,
    Deserialize,
    Serialize,
};
use tracing::debug;

use super::{
    Session,
    VocabularyStore,
};
use crate::core::{
    EntryId,
    EntryPatch,
    NewVocabularyEntry,
    StoreError,
    TemporaryWord,
    UserId,
    VocabularyEntry,
};

const VOCABULARY_TABLE: &str = "vocabulary";
const TEMPORARY_WORDS_TABLE: &str = "temporary_words";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Public anon key sent as `apikey` on every request.
    pub anon_key: String,
}

impl BackendConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    fn table(&self, table: &str) -> String {
        self.endpoint(&format!("rest/v1/{table}"))
    }
}

pub fn http_client() -> Result<Client, StoreError> {
    Ok(Client::builder().timeout(Duration::from_secs(30)).build()?)
}

/// Turns a non-2xx response into a `StoreError` carrying the backend's message.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or(body);

    if status.as_u16() == 401 {
        debug!("Backend rejected credentials: {}", message);
        return Err(StoreError::Unauthenticated);
    }

    Err(StoreError::Status { status: status.as_u16(), message })
}

// PostgREST and GoTrue use different field names for the same thing.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message.or(self.msg).or(self.error_description)
    }
}

#[derive(Serialize)]
struct OwnedRow<'a, T> {
    user_id: &'a UserId,
    #[serde(flatten)]
    row: &'a T,
}

#[derive(Serialize)]
struct TemporaryWordRow<'a> {
    user_id: &'a UserId,
    word: &'a str,
}

/// PostgREST client for the `vocabulary` and `temporary_words` tables.
pub struct RestStore {
    client: Client,
    config: BackendConfig,
    session: Session,
}

impl RestStore {
    pub fn new(config: BackendConfig, session: Session) -> Result<Self, StoreError> {
        Ok(Self { client: http_client()?, config, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.session.access_token)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        user: &UserId,
    ) -> Result<Vec<T>, StoreError> {
        let request = self.client.get(self.config.table(table)).query(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{user}")),
            ("order", "created_at.desc".to_string()),
        ]);

        let response = ensure_success(self.authorized(request).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn insert<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<(), StoreError> {
        let request = self
            .client
            .post(self.config.table(table))
            .header("Prefer", "return=minimal")
            .json(rows);

        ensure_success(self.authorized(request).send().await?).await?;
        Ok(())
    }

    async fn delete_by_id(&self, table: &str, id: &EntryId) -> Result<(), StoreError> {
        let request =
            self.client.delete(self.config.table(table)).query(&[("id", format!("eq.{id}"))]);

        ensure_success(self.authorized(request).send().await?).await?;
        Ok(())
    }
}

impl VocabularyStore for RestStore {
    async fn fetch_entries(&self, user: &UserId) -> Result<Vec<VocabularyEntry>, StoreError> {
        let entries: Vec<VocabularyEntry> = self.select(VOCABULARY_TABLE, user).await?;
        debug!("Fetched {} vocabulary entries", entries.len());
        Ok(entries)
    }

    async fn insert_entries(
        &self,
        user: &UserId,
        entries: &[NewVocabularyEntry],
    ) -> Result<(), StoreError> {
        let rows: Vec<OwnedRow<'_, NewVocabularyEntry>> =
            entries.iter().map(|row| OwnedRow { user_id: user, row }).collect();
        self.insert(VOCABULARY_TABLE, &rows).await
    }

    async fn update_entry(&self, id: &EntryId, patch: &EntryPatch) -> Result<(), StoreError> {
        let request = self
            .client
            .patch(self.config.table(VOCABULARY_TABLE))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(patch);

        ensure_success(self.authorized(request).send().await?).await?;
        Ok(())
    }

    async fn delete_entry(&self, id: &EntryId) -> Result<(), StoreError> {
        self.delete_by_id(VOCABULARY_TABLE, id).await
    }

    async fn fetch_temporary_words(
        &self,
        user: &UserId,
    ) -> Result<Vec<TemporaryWord>, StoreError> {
        self.select(TEMPORARY_WORDS_TABLE, user).await
    }

    async fn insert_temporary_word(&self, user: &UserId, word: &str) -> Result<(), StoreError> {
        self.insert(TEMPORARY_WORDS_TABLE, &[TemporaryWordRow { user_id: user, word }]).await
    }

    async fn delete_temporary_word(&self, id: &EntryId) -> Result<(), StoreError> {
        self.delete_by_id(TEMPORARY_WORDS_TABLE, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_cleanly() {
        let config = BackendConfig {
            url: "https://example.supabase.co/".to_string(),
            anon_key: "key".to_string(),
        };
        assert_eq!(config.table("vocabulary"), "https://example.supabase.co/rest/v1/vocabulary");
        assert_eq!(
            config.endpoint("/auth/v1/logout"),
            "https://example.supabase.co/auth/v1/logout"
        );
        assert!(config.is_configured());
        assert!(!BackendConfig::default().is_configured());
    }

    #[test]
    fn inserted_rows_carry_owner() {
        let user = UserId::new("u-1");
        let entry = NewVocabularyEntry::with_term("lucid");
        let row = OwnedRow { user_id: &user, row: &entry };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["user_id"], "u-1");
        assert_eq!(json["word"], "lucid");
        assert_eq!(json["pos"], "noun");
        assert_eq!(json["star"], false);
    }

    #[test]
    fn error_body_prefers_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"msg":"Invalid login credentials"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid login credentials"));
    }
}
