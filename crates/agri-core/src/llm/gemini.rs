use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::gateway::{
    ContentPart, GenerationError, GenerationFuture, GenerationRequest, GenerationResponse,
    GenerativeModel, TokenUsage,
};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    /// Base of the REST API, without trailing slash, e.g. `.../v1beta`.
    pub api_base_url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Error)]
pub enum GeminiClientError {
    #[error("failed to build Gemini http client: {0}")]
    HttpClient(String),
}

/// `generateContent` client for the Gemini REST API. Sends exactly one request per call.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiClientConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiClientConfig) -> Result<Self, GeminiClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| GeminiClientError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:generateContent",
            self.config.api_base_url.trim_end_matches('/')
        )
    }

    async fn send(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let body = GenerateContentBody {
            contents: vec![WireContent {
                role: "user",
                parts: request.parts.iter().map(WirePart::from).collect(),
            }],
        };

        debug!(
            model = %request.model,
            parts = request.parts.len(),
            has_image = request.has_image(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    GenerationError::Timeout
                } else {
                    GenerationError::ProviderFailure("request_unavailable".to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|_| {
            GenerationError::InvalidProviderPayload("response_body_read_failed".to_string())
        })?;

        if !status.is_success() {
            return Err(GenerationError::ProviderFailure(format!(
                "status={} code={}",
                status.as_u16(),
                parse_provider_error_status(&body)
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|_| {
            GenerationError::InvalidProviderPayload("response_json_parse_failed".to_string())
        })?;

        Ok(GenerationResponse {
            model: parsed
                .model_version
                .clone()
                .unwrap_or_else(|| request.model.clone()),
            response_id: parsed.response_id.clone(),
            text: parsed.first_candidate_text(),
            usage: parsed.usage_metadata.map(|usage| TokenUsage {
                prompt_tokens: usage.prompt_token_count.unwrap_or(0),
                completion_tokens: usage.candidates_token_count.unwrap_or(0),
                total_tokens: usage.total_token_count.unwrap_or(0),
            }),
        })
    }
}

impl GenerativeModel for GeminiClient {
    fn generate<'a>(
        &'a self,
        api_key: &'a str,
        request: GenerationRequest,
    ) -> GenerationFuture<'a> {
        Box::pin(async move { self.send(api_key, &request).await })
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentBody<'a> {
    contents: Vec<WireContent<'a>>,
}

#[derive(Debug, Serialize)]
struct WireContent<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: WireBlob<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

impl<'a> From<&'a ContentPart> for WirePart<'a> {
    fn from(part: &'a ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => Self::Text { text },
            ContentPart::InlineImage {
                mime_type,
                data_base64,
            } => Self::InlineData {
                inline_data: WireBlob {
                    mime_type,
                    data: data_base64,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
    response_id: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated non-thought text parts of the first candidate.
    fn first_candidate_text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let texts: Vec<&str> = parts
            .iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text.as_deref())
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

fn parse_provider_error_status(body: &str) -> String {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<ProviderErrorDetails>,
    }

    #[derive(Deserialize)]
    struct ProviderErrorDetails {
        status: Option<String>,
    }

    serde_json::from_str::<ProviderErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|details| details.status)
        .unwrap_or_else(|| "unknown".to_string())
}
