use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::image::ImagePayload;

pub type GenerationFuture<'a> =
    Pin<Box<dyn Future<Output = Result<GenerationResponse, GenerationError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    InlineImage { mime_type: String, data_base64: String },
}

/// A single-turn generation request against one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model: String,
    pub parts: Vec<ContentPart>,
}

impl GenerationRequest {
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            parts: vec![ContentPart::Text(prompt.into())],
        }
    }

    /// Image first, instruction second.
    pub fn with_image(
        model: impl Into<String>,
        image: &ImagePayload,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            parts: vec![
                ContentPart::InlineImage {
                    mime_type: image.mime_type().to_string(),
                    data_base64: image.to_base64(),
                },
                ContentPart::Text(instruction.into()),
            ],
        }
    }

    pub fn has_image(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, ContentPart::InlineImage { .. }))
    }

    pub fn prompt_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text(text) => Some(text.as_str()),
                ContentPart::InlineImage { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub model: String,
    pub response_id: Option<String>,
    pub text: Option<String>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model provider request timed out")]
    Timeout,
    #[error("model provider request failed: {0}")]
    ProviderFailure(String),
    #[error("model provider returned an invalid payload: {0}")]
    InvalidProviderPayload(String),
}

impl GenerationError {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::ProviderFailure(_) => "provider_failure",
            Self::InvalidProviderPayload(_) => "invalid_payload",
        }
    }
}

/// Remote text/vision model. The credential is supplied per call.
pub trait GenerativeModel: Send + Sync {
    fn generate<'a>(
        &'a self,
        api_key: &'a str,
        request: GenerationRequest,
    ) -> GenerationFuture<'a>;
}
