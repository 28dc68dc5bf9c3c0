// Generative-text backend client
//
// Single request/response against `models/{model}:generateContent` -- no
// streaming, no conversation state (the caller owns the transcript).

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

// ── Generation parameters ───────────────────────────────────────────

/// Model sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenAiParams {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenAiParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

// ── Client ──────────────────────────────────────────────────────────

/// Client for the generative-text backend.
pub struct GenAiClient {
    http: reqwest::Client,
    base_url: Url,
    model: String,
    api_key: SecretString,
    params: GenAiParams,
}

impl GenAiClient {
    pub fn new(
        base_url: Url,
        model: impl Into<String>,
        api_key: SecretString,
        params: GenAiParams,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            model: model.into(),
            api_key,
            params,
        })
    }

    /// Generate a completion for `prompt`. Returns the concatenated text
    /// of the first candidate.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!(
            "{base}/v1beta/models/{}:generateContent",
            self.model
        ))?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.params.temperature,
                "topK": self.params.top_k,
                "topP": self.params.top_p,
                "maxOutputTokens": self.params.max_output_tokens,
            },
        });

        debug!(model = %self.model, "generate request");
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        match status.as_u16() {
            429 => {
                let retry_after_secs = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                return Err(Error::RateLimited { retry_after_secs });
            }
            401 | 403 => {
                return Err(Error::Authentication {
                    message: "generative backend rejected the API key".into(),
                    code: None,
                });
            }
            _ if !status.is_success() => {
                let body = resp.text().await.unwrap_or_default();
                return Err(Error::Api {
                    message: format!("generate failed (HTTP {status}): {}", &body[..body.len().min(200)]),
                    status: Some(status.as_u16()),
                });
            }
            _ => {}
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        let text: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::Api {
                message: "generate returned no candidates".into(),
                status: None,
            });
        }

        Ok(text)
    }
}
