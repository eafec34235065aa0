use std::time::Duration;

use super::gateway::{
    GenerationFuture, GenerationRequest, GenerationResponse, GenerativeModel, TokenUsage,
};

const CANNED_DIAGNOSIS: &str = "## Diagnosis\nEarly blight (Alternaria solani)\n\n## Confidence\nModerate (offline sample)\n\n## Causes\nFungal spores spread by rain splash and warm, humid weather.\n\n## Treatment\nRemove infected leaves, avoid overhead watering, and apply a copper-based fungicide every 7-10 days.";

/// Offline stand-in for the remote model. Answers every request with fixed
/// sample text after a short simulated latency.
#[derive(Debug, Clone)]
pub struct CannedModel {
    latency: Duration,
}

impl Default for CannedModel {
    fn default() -> Self {
        Self::new(Duration::from_millis(600))
    }
}

impl CannedModel {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl GenerativeModel for CannedModel {
    fn generate<'a>(
        &'a self,
        _api_key: &'a str,
        request: GenerationRequest,
    ) -> GenerationFuture<'a> {
        Box::pin(async move {
            tokio::time::sleep(self.latency).await;

            let text = if request.has_image() {
                CANNED_DIAGNOSIS.to_string()
            } else {
                canned_answer(&request.prompt_text())
            };

            Ok(GenerationResponse {
                model: format!("canned/{}", request.model),
                response_id: None,
                usage: Some(TokenUsage {
                    prompt_tokens: 0,
                    completion_tokens: 0,
                    total_tokens: 0,
                }),
                text: Some(text),
            })
        })
    }
}

fn canned_answer(prompt: &str) -> String {
    let question = prompt
        .split_once("The user asks: \"")
        .and_then(|(_, rest)| rest.rsplit_once("\". Answer in"))
        .map(|(question, _)| question)
        .unwrap_or(prompt);

    format!(
        "(offline sample) For \"{question}\": test your soil first, follow the local \
         agriculture office's dose chart, and split fertilizer into two or three applications."
    )
}
