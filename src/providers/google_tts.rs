//! Google Cloud Text-to-Speech over REST.
//!
//! `POST {base}/v1/text:synthesize` with the text, the voice selection and
//! the audio config; the answer carries the encoded audio as base64 in
//! `audioContent`. One request takes at most 5000 bytes of input, which the
//! speech stage respects by chunking.
//!
//! ## Status mapping
//!
//! | Response                                | Error                              |
//! |-----------------------------------------|------------------------------------|
//! | 401, 403                                | [`SynthesisError::Authentication`] |
//! | 429, 403 with quota / `RESOURCE_EXHAUSTED` | [`SynthesisError::QuotaExceeded`] |
//! | any other 4xx or 5xx                    | [`SynthesisError::Provider`]       |
//! | connect / timeout / transport failure   | [`SynthesisError::Network`]        |

use crate::config::VoiceConfig;
use crate::credentials::TtsCredentials;
use crate::error::{Doc2PodcastError, SynthesisError};
use crate::providers::google_auth::ServiceAccountTokenSource;
use crate::providers::{truncate_body, SpeechProvider};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Public endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://texttospeech.googleapis.com";
/// Per-request input limit documented by the API.
pub const MAX_REQUEST_BYTES: usize = 5000;

const PROVIDER: &str = "google-tts";

/// Connection settings for [`GoogleTtsProvider`].
#[derive(Debug, Clone)]
pub struct GoogleTtsOptions {
    /// Endpoint root. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,
    /// HTTP timeout per request in seconds. Default: 60.
    pub timeout_secs: u64,
    /// Per-request input limit in bytes. Default: [`MAX_REQUEST_BYTES`].
    pub max_request_bytes: usize,
}

impl Default for GoogleTtsOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
            max_request_bytes: MAX_REQUEST_BYTES,
        }
    }
}

// ── Wire format ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    ssml_gender: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
    pitch: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_rate_hertz: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

fn build_request<'a>(text: &'a str, voice: &'a VoiceConfig) -> SynthesizeRequest<'a> {
    SynthesizeRequest {
        input: SynthesisInput { text },
        voice: VoiceSelection {
            language_code: &voice.language_code,
            name: voice.voice_name.as_deref(),
            ssml_gender: voice.gender.as_ssml(),
        },
        audio_config: AudioConfig {
            audio_encoding: voice.encoding.as_api_name(),
            speaking_rate: voice.speaking_rate,
            pitch: voice.pitch,
            sample_rate_hertz: voice.sample_rate_hertz,
        },
    }
}

/// Map a non-success response to the synthesis error taxonomy.
fn map_status(status: u16, body: &str) -> SynthesisError {
    let (message, api_status) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => (env.error.message, env.error.status),
        Err(_) => (truncate_body(body), String::new()),
    };
    let detail = if message.is_empty() {
        format!("HTTP {status}")
    } else {
        message
    };

    let quota = api_status == "RESOURCE_EXHAUSTED" || detail.to_ascii_lowercase().contains("quota");

    match status {
        429 => SynthesisError::QuotaExceeded {
            provider: PROVIDER.into(),
            detail,
        },
        403 if quota => SynthesisError::QuotaExceeded {
            provider: PROVIDER.into(),
            detail,
        },
        401 | 403 => SynthesisError::Authentication {
            provider: PROVIDER.into(),
            detail,
        },
        _ if quota => SynthesisError::QuotaExceeded {
            provider: PROVIDER.into(),
            detail,
        },
        _ => SynthesisError::Provider {
            provider: PROVIDER.into(),
            status,
            detail,
        },
    }
}

fn network_error(e: reqwest::Error) -> SynthesisError {
    SynthesisError::Network {
        provider: PROVIDER.into(),
        detail: if e.is_timeout() {
            format!("request timed out: {e}")
        } else {
            e.to_string()
        },
    }
}

// ── Provider ─────────────────────────────────────────────────────────────

enum Auth {
    ApiKey(String),
    Bearer(String),
    ServiceAccount(ServiceAccountTokenSource),
}

/// Speech provider backed by Google Cloud Text-to-Speech.
pub struct GoogleTtsProvider {
    client: reqwest::Client,
    endpoint: String,
    auth: Auth,
    options: GoogleTtsOptions,
}

impl std::fmt::Debug for GoogleTtsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let auth = match self.auth {
            Auth::ApiKey(_) => "api-key",
            Auth::Bearer(_) => "access-token",
            Auth::ServiceAccount(_) => "service-account",
        };
        f.debug_struct("GoogleTtsProvider")
            .field("endpoint", &self.endpoint)
            .field("auth", &auth)
            .field("options", &self.options)
            .finish()
    }
}

impl GoogleTtsProvider {
    pub fn new(
        credentials: TtsCredentials,
        options: GoogleTtsOptions,
    ) -> Result<Self, Doc2PodcastError> {
        if options.max_request_bytes == 0 {
            return Err(Doc2PodcastError::InvalidConfig(
                "max_request_bytes must be ≥ 1".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| Doc2PodcastError::Internal(format!("HTTP client: {e}")))?;

        let auth = match credentials {
            TtsCredentials::ApiKey(key) => Auth::ApiKey(key),
            TtsCredentials::AccessToken(token) => Auth::Bearer(token),
            TtsCredentials::ServiceAccount(key) => {
                Auth::ServiceAccount(ServiceAccountTokenSource::new(key, client.clone()))
            }
        };
        let endpoint = format!(
            "{}/v1/text:synthesize",
            options.base_url.trim_end_matches('/')
        );

        Ok(Self {
            client,
            endpoint,
            auth,
            options,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SpeechProvider for GoogleTtsProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn max_request_bytes(&self) -> usize {
        self.options.max_request_bytes
    }

    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>, SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyInput);
        }

        let body = build_request(text, voice);
        let mut request = self.client.post(&self.endpoint).json(&body);
        request = match &self.auth {
            Auth::ApiKey(key) => request.header("x-goog-api-key", key),
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::ServiceAccount(source) => request.bearer_auth(source.access_token().await?),
        };

        debug!(
            "POST {} ({} bytes, {}, {})",
            self.endpoint,
            text.len(),
            voice.language_code,
            voice.encoding.as_api_name()
        );

        let response = request.send().await.map_err(network_error)?;
        let status = response.status();
        let body = response.text().await.map_err(network_error)?;

        if !status.is_success() {
            return Err(map_status(status.as_u16(), &body));
        }

        let parsed: SynthesizeResponse =
            serde_json::from_str(&body).map_err(|e| SynthesisError::InvalidResponse {
                provider: PROVIDER.into(),
                detail: format!("{e}: {}", truncate_body(&body)),
            })?;
        let encoded = parsed
            .audio_content
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SynthesisError::InvalidResponse {
                provider: PROVIDER.into(),
                detail: "response has no audioContent".into(),
            })?;

        STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| SynthesisError::InvalidResponse {
                provider: PROVIDER.into(),
                detail: format!("audioContent is not valid base64: {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AudioEncoding, VoiceGender};

    #[test]
    fn request_body_matches_api_shape() {
        let voice = VoiceConfig {
            voice_name: Some("en-US-Neural2-F".into()),
            encoding: AudioEncoding::Linear16,
            sample_rate_hertz: Some(24000),
            ..VoiceConfig::default()
        };
        let value = serde_json::to_value(build_request("Hello.", &voice)).unwrap();
        assert_eq!(value["input"]["text"], "Hello.");
        assert_eq!(value["voice"]["languageCode"], "en-US");
        assert_eq!(value["voice"]["name"], "en-US-Neural2-F");
        assert_eq!(value["voice"]["ssmlGender"], "FEMALE");
        assert_eq!(value["audioConfig"]["audioEncoding"], "LINEAR16");
        assert_eq!(value["audioConfig"]["speakingRate"], 1.0);
        assert_eq!(value["audioConfig"]["sampleRateHertz"], 24000);
    }

    #[test]
    fn optional_fields_are_omitted() {
        let voice = VoiceConfig {
            gender: VoiceGender::Male,
            ..VoiceConfig::default()
        };
        let value = serde_json::to_value(build_request("Hi", &voice)).unwrap();
        assert!(value["voice"].get("name").is_none());
        assert!(value["audioConfig"].get("sampleRateHertz").is_none());
        assert_eq!(value["voice"]["ssmlGender"], "MALE");
    }

    #[test]
    fn status_mapping() {
        let body = r#"{"error":{"code":403,"message":"API key not valid.","status":"PERMISSION_DENIED"}}"#;
        assert!(matches!(map_status(403, body), SynthesisError::Authentication { .. }));
        assert!(matches!(map_status(401, "nope"), SynthesisError::Authentication { .. }));

        let body = r#"{"error":{"code":403,"message":"Quota exceeded for quota metric","status":"PERMISSION_DENIED"}}"#;
        assert!(matches!(map_status(403, body), SynthesisError::QuotaExceeded { .. }));
        assert!(matches!(map_status(429, ""), SynthesisError::QuotaExceeded { .. }));

        let body = r#"{"error":{"code":400,"message":"Voice 'xx' does not exist.","status":"INVALID_ARGUMENT"}}"#;
        match map_status(400, body) {
            SynthesisError::Provider { status, detail, .. } => {
                assert_eq!(status, 400);
                assert!(detail.contains("does not exist"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(map_status(500, "boom"), SynthesisError::Provider { status: 500, .. }));
    }

    #[test]
    fn endpoint_and_limit() {
        let provider = GoogleTtsProvider::new(
            TtsCredentials::api_key("k"),
            GoogleTtsOptions {
                base_url: "http://127.0.0.1:9/".into(),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(provider.endpoint(), "http://127.0.0.1:9/v1/text:synthesize");
        assert_eq!(provider.max_request_bytes(), MAX_REQUEST_BYTES);
        assert!(!format!("{provider:?}").contains("\"k\""));
    }
}
