use std::time::Duration;

use chrono::{
    DateTime,
    TimeDelta,
    Utc,
};
use reqwest::Client;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    info,
    warn,
};

use super::api::{
    ensure_success,
    http_client,
    BackendConfig,
};
use crate::core::{
    StoreError,
    UserId,
};

/// Renew the access token this long before it runs out.
const REFRESH_MARGIN: TimeDelta = TimeDelta::seconds(60);

/// A signed-in user. Every store call is made on behalf of `user_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// When the access token should be renewed. `None` if it cannot be renewed.
    pub fn refresh_at(&self) -> Option<DateTime<Utc>> {
        self.refresh_token.as_ref()?;
        self.expires_at.map(|expires_at| expires_at - REFRESH_MARGIN)
    }

    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.refresh_at().is_some_and(|refresh_at| now >= refresh_at)
    }

    /// Time left until `needs_refresh` turns true, for scheduling a wake-up.
    pub fn time_until_refresh(&self, now: DateTime<Utc>) -> Option<Duration> {
        let refresh_at = self.refresh_at()?;
        Some((refresh_at - now).to_std().unwrap_or(Duration::ZERO))
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
}

impl TokenResponse {
    fn into_session(self, fallback_email: &str, issued_at: DateTime<Utc>) -> Session {
        Session {
            user_id: self.user.id,
            email: self.user.email.unwrap_or_else(|| fallback_email.to_string()),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self.expires_in.map(|seconds| issued_at + TimeDelta::seconds(seconds)),
        }
    }
}

// Some backends rotate refresh tokens and some do not; keep the old one if none came back.
fn renewed(previous: &Session, mut next: Session) -> Session {
    if next.refresh_token.is_none() {
        next.refresh_token = previous.refresh_token.clone();
    }
    next
}

/// Email/password identity provider of the hosted backend.
pub struct AuthClient {
    client: Client,
    config: BackendConfig,
}

impl AuthClient {
    pub fn new(config: BackendConfig) -> Result<Self, StoreError> {
        Ok(Self { client: http_client()?, config })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let response = self
            .client
            .post(self.config.endpoint("auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.config.anon_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        let token: TokenResponse = ensure_success(response).await?.json().await?;
        let session = token.into_session(email, Utc::now());
        info!("Signed in as {}", session.email);
        Ok(session)
    }

    /// Trades the session's refresh token for a new access token.
    pub async fn refresh(&self, session: &Session) -> Result<Session, StoreError> {
        let Some(refresh_token) = session.refresh_token.as_deref() else {
            return Err(StoreError::Unauthenticated);
        };

        let response = self
            .client
            .post(self.config.endpoint("auth/v1/token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.config.anon_key)
            .json(&RefreshGrant { refresh_token })
            .send()
            .await?;

        // A rejected refresh token means the session is over.
        let response = match ensure_success(response).await {
            Err(StoreError::Status { status: 400, .. }) => return Err(StoreError::Unauthenticated),
            other => other?,
        };

        let token: TokenResponse = response.json().await?;
        let refreshed = renewed(session, token.into_session(&session.email, Utc::now()));
        debug!("Refreshed access token for {}", refreshed.email);
        Ok(refreshed)
    }

    /// Revokes the session's token. Callers drop local state whatever the outcome.
    pub async fn sign_out(&self, session: &Session) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.config.endpoint("auth/v1/logout"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        if let Err(e) = ensure_success(response).await {
            warn!("Sign-out was not acknowledged: {}", e);
            return Err(e);
        }
        Ok(())
    }
}
