//! Text-to-speech credentials.
//!
//! Credentials are process configuration, not business logic: the binary
//! builds one [`TtsCredentials`] at start-up (usually via
//! [`TtsCredentials::from_env`]) and passes it to
//! [`crate::providers::GoogleTtsProvider::new`]. Nothing inside the pipeline
//! reads the environment.

use crate::error::Doc2PodcastError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Service-account JSON content (what the Google console downloads).
pub const ENV_CREDENTIALS_JSON: &str = "GOOGLE_CREDENTIALS_JSON";
/// Path to a service-account JSON file.
pub const ENV_CREDENTIALS_PATH: &str = "GOOGLE_APPLICATION_CREDENTIALS";
/// Plain API key restricted to the Text-to-Speech API.
pub const ENV_API_KEY: &str = "GOOGLE_TTS_API_KEY";
/// Pre-minted OAuth2 bearer token, e.g. `gcloud auth print-access-token`.
pub const ENV_ACCESS_TOKEN: &str = "GOOGLE_ACCESS_TOKEN";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a Google service-account key that the token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// How to authenticate against the TTS provider.
#[derive(Clone)]
pub enum TtsCredentials {
    /// Sent as the `x-goog-api-key` header.
    ApiKey(String),
    /// Sent as `Authorization: Bearer …` as-is; never refreshed.
    AccessToken(String),
    /// Exchanged for short-lived access tokens (RS256 JWT bearer grant).
    ServiceAccount(ServiceAccountKey),
}

impl TtsCredentials {
    pub fn api_key(key: impl Into<String>) -> Self {
        TtsCredentials::ApiKey(key.into())
    }

    pub fn access_token(token: impl Into<String>) -> Self {
        TtsCredentials::AccessToken(token.into())
    }

    /// Parse service-account JSON content.
    pub fn from_service_account_json(json: &str) -> Result<Self, Doc2PodcastError> {
        let key: ServiceAccountKey = serde_json::from_str(json).map_err(|e| {
            Doc2PodcastError::Credentials(format!("invalid service-account JSON: {e}"))
        })?;
        if let Some(kind) = key.key_type.as_deref() {
            if kind != "service_account" {
                return Err(Doc2PodcastError::Credentials(format!(
                    "expected a service_account key, got '{kind}'"
                )));
            }
        }
        if key.private_key.trim().is_empty() || key.client_email.trim().is_empty() {
            return Err(Doc2PodcastError::Credentials(
                "service-account JSON lacks private_key or client_email".into(),
            ));
        }
        Ok(TtsCredentials::ServiceAccount(key))
    }

    /// Read and parse a service-account JSON file.
    pub fn from_service_account_file(path: impl AsRef<Path>) -> Result<Self, Doc2PodcastError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Doc2PodcastError::Credentials(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_service_account_json(&json)
    }

    /// Load credentials from the process environment.
    ///
    /// First match wins: `GOOGLE_CREDENTIALS_JSON`, `GOOGLE_APPLICATION_CREDENTIALS`,
    /// `GOOGLE_TTS_API_KEY`, `GOOGLE_ACCESS_TOKEN`. Empty values are ignored.
    pub fn from_env() -> Result<Self, Doc2PodcastError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same precedence as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Doc2PodcastError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(json) = get(ENV_CREDENTIALS_JSON) {
            return Self::from_service_account_json(&json);
        }
        if let Some(path) = get(ENV_CREDENTIALS_PATH) {
            return Self::from_service_account_file(path.trim());
        }
        if let Some(key) = get(ENV_API_KEY) {
            return Ok(Self::api_key(key.trim()));
        }
        if let Some(token) = get(ENV_ACCESS_TOKEN) {
            return Ok(Self::access_token(token.trim()));
        }

        Err(Doc2PodcastError::Credentials(format!(
            "no TTS credentials found.\nSet one of {ENV_CREDENTIALS_JSON}, \
{ENV_CREDENTIALS_PATH}, {ENV_API_KEY} or {ENV_ACCESS_TOKEN}."
        )))
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TtsCredentials::ApiKey(_) => "api-key",
            TtsCredentials::AccessToken(_) => "access-token",
            TtsCredentials::ServiceAccount(_) => "service-account",
        }
    }
}

impl fmt::Debug for TtsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TtsCredentials::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            TtsCredentials::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            TtsCredentials::ServiceAccount(key) => {
                f.debug_tuple("ServiceAccount").field(key).finish()
            }
        }
    }
}
