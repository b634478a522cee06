//! Caller-name resolution against the Google People API.
//!
//! Optional collaborator: when Google credentials are configured, the
//! pipeline asks for a display name to put in the task description and
//! falls back to the raw number on any failure. Credentials live in an
//! explicit session object with an explicit refresh operation — no
//! ambient token state.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::ContactsError;

const DEFAULT_PEOPLE_URL: &str = "https://people.googleapis.com";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Resolves a canonical phone number to a human display name.
#[async_trait]
pub trait ContactLookup: Send + Sync {
    /// `Ok(None)` means "no contact found" — a normal outcome.
    async fn display_name(&self, phone: &str) -> Result<Option<String>, ContactsError>;
}

/// OAuth2 client credentials for the contacts directory.
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub refresh_token: SecretString,
}

/// Holds the short-lived access token and knows how to renew it.
struct GoogleSession {
    credentials: GoogleCredentials,
    token_url: String,
    access_token: Mutex<Option<SecretString>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GoogleSession {
    /// Exchange the refresh token for a fresh access token.
    async fn refresh(&self, client: &reqwest::Client) -> Result<SecretString, ContactsError> {
        let form = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.expose_secret()),
            ("refresh_token", self.credentials.refresh_token.expose_secret()),
            ("grant_type", "refresh_token"),
        ];
        let resp = client.post(&self.token_url).form(&form).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ContactsError::Refresh(format!("{status}: {body}")));
        }
        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ContactsError::Refresh(e.to_string()))?;

        let secret = SecretString::from(token.access_token);
        *self.access_token.lock().await = Some(secret.clone());
        info!("Google access token refreshed");
        Ok(secret)
    }

    /// Current token, refreshing if none has been obtained yet.
    async fn bearer(&self, client: &reqwest::Client) -> Result<SecretString, ContactsError> {
        if let Some(token) = self.access_token.lock().await.clone() {
            return Ok(token);
        }
        self.refresh(client).await
    }
}

// ── People API response shapes ──────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    person: Option<Person>,
}

#[derive(Debug, Deserialize)]
struct Person {
    #[serde(default)]
    names: Vec<PersonName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonName {
    display_name: Option<String>,
}

/// Google People `searchContacts` client.
pub struct GoogleContacts {
    session: GoogleSession,
    base_url: String,
    client: reqwest::Client,
}

impl GoogleContacts {
    pub fn new(credentials: GoogleCredentials) -> Self {
        Self {
            session: GoogleSession {
                credentials,
                token_url: DEFAULT_TOKEN_URL.to_string(),
                access_token: Mutex::new(None),
            },
            base_url: DEFAULT_PEOPLE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point at different API/token endpoints (tests).
    pub fn with_base_urls(
        mut self,
        people_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.base_url = people_url.into();
        self.session.token_url = token_url.into();
        self
    }

    async fn search(&self, phone: &str, bearer: &SecretString) -> Result<reqwest::Response, ContactsError> {
        let resp = self
            .client
            .get(format!("{}/v1/people:searchContacts", self.base_url))
            .bearer_auth(bearer.expose_secret())
            .query(&[
                ("query", phone),
                ("pageSize", "1"),
                ("readMask", "names,phoneNumbers"),
            ])
            .send()
            .await?;
        Ok(resp)
    }
}

#[async_trait]
impl ContactLookup for GoogleContacts {
    async fn display_name(&self, phone: &str) -> Result<Option<String>, ContactsError> {
        let bearer = self.session.bearer(&self.client).await?;
        let mut resp = self.search(phone, &bearer).await?;

        // Expired access token: refresh once and retry.
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            debug!("Google access token expired; refreshing");
            let bearer = self.session.refresh(&self.client).await?;
            resp = self.search(phone, &bearer).await?;
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ContactsError::InvalidResponse(format!("{status}: {body}")));
        }

        let parsed: SearchResponse = resp
            .json()
            .await
            .map_err(|e| ContactsError::InvalidResponse(e.to_string()))?;

        let name = parsed
            .results
            .into_iter()
            .next()
            .and_then(|r| r.person)
            .and_then(|p| p.names.into_iter().next())
            .and_then(|n| n.display_name);

        Ok(name)
    }
}
