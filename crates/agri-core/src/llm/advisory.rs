use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::credentials::{ConfigurationError, CredentialSource};
use super::gateway::{GenerationRequest, GenerativeModel};
use super::prompts::{
    ADVISORY_EMPTY_FALLBACK, ADVISORY_FAILURE_FALLBACK, DIAGNOSIS_EMPTY_FALLBACK,
    DIAGNOSIS_FAILURE_FALLBACK, DIAGNOSIS_INSTRUCTION, advisory_prompt,
};
use crate::config::{DEFAULT_TEXT_MODEL, DEFAULT_VISION_MODEL};
use crate::image::ImagePayload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryModels {
    pub vision: String,
    pub text: String,
}

impl Default for AdvisoryModels {
    fn default() -> Self {
        Self {
            vision: DEFAULT_VISION_MODEL.to_string(),
            text: DEFAULT_TEXT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdvisoryOperation {
    Diagnosis,
    Question,
}

impl AdvisoryOperation {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Diagnosis => "diagnose_plant",
            Self::Question => "ask_advisor",
        }
    }

    const fn empty_fallback(self) -> &'static str {
        match self {
            Self::Diagnosis => DIAGNOSIS_EMPTY_FALLBACK,
            Self::Question => ADVISORY_EMPTY_FALLBACK,
        }
    }

    const fn failure_fallback(self) -> &'static str {
        match self {
            Self::Diagnosis => DIAGNOSIS_FAILURE_FALLBACK,
            Self::Question => ADVISORY_FAILURE_FALLBACK,
        }
    }
}

/// Façade over the remote model for the two advisory operations.
///
/// Transport and provider failures never escape: they are logged and replaced
/// by a fixed fallback sentence, as are empty responses. The only error a
/// caller sees is a missing credential, which is detected before any request
/// is built.
#[derive(Clone)]
pub struct AdvisoryGateway {
    model: Arc<dyn GenerativeModel>,
    credentials: Arc<dyn CredentialSource>,
    models: AdvisoryModels,
}

impl AdvisoryGateway {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        credentials: Arc<dyn CredentialSource>,
        models: AdvisoryModels,
    ) -> Self {
        Self {
            model,
            credentials,
            models,
        }
    }

    pub async fn diagnose_plant(&self, image: &ImagePayload) -> Result<String, ConfigurationError> {
        let api_key = self.credentials.api_key()?;
        let request =
            GenerationRequest::with_image(&self.models.vision, image, DIAGNOSIS_INSTRUCTION);
        Ok(self
            .generate_or_fallback(AdvisoryOperation::Diagnosis, &api_key, request)
            .await)
    }

    /// `language` is interpolated into the prompt verbatim.
    pub async fn ask_advisor(
        &self,
        question: &str,
        language: &str,
    ) -> Result<String, ConfigurationError> {
        let api_key = self.credentials.api_key()?;
        let request =
            GenerationRequest::text(&self.models.text, advisory_prompt(question, language));
        Ok(self
            .generate_or_fallback(AdvisoryOperation::Question, &api_key, request)
            .await)
    }

    async fn generate_or_fallback(
        &self,
        operation: AdvisoryOperation,
        api_key: &str,
        request: GenerationRequest,
    ) -> String {
        let model = request.model.clone();
        let started_at = Instant::now();
        let result = self.model.generate(api_key, request).await;
        let latency_ms = duration_to_millis(started_at.elapsed());

        match result {
            Ok(response) => match response.text.filter(|text| !text.trim().is_empty()) {
                Some(text) => {
                    let usage = response.usage.unwrap_or_default();
                    info!(
                        operation = operation.as_str(),
                        model = %response.model,
                        latency_ms,
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        outcome = "answered",
                        "advisory call completed"
                    );
                    text
                }
                None => {
                    info!(
                        operation = operation.as_str(),
                        model = %response.model,
                        latency_ms,
                        outcome = "empty",
                        "advisory call returned no text"
                    );
                    operation.empty_fallback().to_string()
                }
            },
            Err(err) => {
                warn!(
                    operation = operation.as_str(),
                    model = %model,
                    latency_ms,
                    error_type = err.kind(),
                    error = %err,
                    outcome = "failed",
                    "advisory call failed"
                );
                operation.failure_fallback().to_string()
            }
        }
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    duration.as_millis().min(u128::from(u64::MAX)) as u64
}
