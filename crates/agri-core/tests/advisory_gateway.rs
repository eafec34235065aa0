use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use agri_core::image::ImagePayload;
use agri_core::llm::{
    ADVISORY_EMPTY_FALLBACK, ADVISORY_FAILURE_FALLBACK, AdvisoryGateway, AdvisoryModels,
    ConfigurationError, ContentPart, DIAGNOSIS_EMPTY_FALLBACK, DIAGNOSIS_FAILURE_FALLBACK,
    DIAGNOSIS_INSTRUCTION, GenerationError, GenerationFuture, GenerationRequest,
    GenerationResponse, GenerativeModel, StaticCredentials,
};

/// Replays scripted outcomes and records every call it receives.
#[derive(Default)]
struct ScriptedModel {
    outcomes: Mutex<VecDeque<Result<Option<String>, GenerationError>>>,
    calls: Mutex<Vec<(String, GenerationRequest)>>,
}

impl ScriptedModel {
    fn replying(outcomes: Vec<Result<Option<String>, GenerationError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(VecDeque::from(outcomes)),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, GenerationRequest)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl GenerativeModel for ScriptedModel {
    fn generate<'a>(
        &'a self,
        api_key: &'a str,
        request: GenerationRequest,
    ) -> GenerationFuture<'a> {
        Box::pin(async move {
            let model = request.model.clone();
            self.calls
                .lock()
                .expect("calls lock")
                .push((api_key.to_string(), request));
            let outcome = self
                .outcomes
                .lock()
                .expect("outcomes lock")
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::ProviderFailure("no script".to_string())));

            outcome.map(|text| GenerationResponse {
                model,
                response_id: None,
                text,
                usage: None,
            })
        })
    }
}

fn gateway_with(model: Arc<ScriptedModel>, credentials: StaticCredentials) -> AdvisoryGateway {
    AdvisoryGateway::new(
        model,
        Arc::new(credentials),
        AdvisoryModels {
            vision: "vision-model".to_string(),
            text: "text-model".to_string(),
        },
    )
}

fn leaf() -> ImagePayload {
    ImagePayload::from_data_uri("data:image/jpeg;base64,/9j/4AAQ").expect("payload should decode")
}

#[tokio::test]
async fn diagnosis_sends_image_then_instruction_to_vision_model() {
    let model = ScriptedModel::replying(vec![Ok(Some("## Disease\nRust".to_string()))]);
    let gateway = gateway_with(model.clone(), StaticCredentials::new("key-1"));

    let text = gateway
        .diagnose_plant(&leaf())
        .await
        .expect("credentials are present");

    assert_eq!(text, "## Disease\nRust");
    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    let (api_key, request) = &calls[0];
    assert_eq!(api_key, "key-1");
    assert_eq!(request.model, "vision-model");
    assert_eq!(
        request.parts,
        vec![
            ContentPart::InlineImage {
                mime_type: "image/jpeg".to_string(),
                data_base64: "/9j/4AAQ".to_string(),
            },
            ContentPart::Text(DIAGNOSIS_INSTRUCTION.to_string()),
        ]
    );
}

#[tokio::test]
async fn diagnosis_failure_degrades_to_fixed_message() {
    let model = ScriptedModel::replying(vec![Err(GenerationError::ProviderFailure(
        "status=403 code=PERMISSION_DENIED".to_string(),
    ))]);
    let gateway = gateway_with(model.clone(), StaticCredentials::new("key-1"));

    let text = gateway
        .diagnose_plant(&leaf())
        .await
        .expect("failures never surface as errors");

    assert_eq!(
        text,
        "Error analyzing image. Please ensure your API key is valid."
    );
    assert_eq!(text, DIAGNOSIS_FAILURE_FALLBACK);
    assert_eq!(model.calls().len(), 1);
}

#[tokio::test]
async fn diagnosis_empty_response_uses_retry_message() {
    let model = ScriptedModel::replying(vec![Ok(None), Ok(Some("  \n".to_string()))]);
    let gateway = gateway_with(model, StaticCredentials::new("key-1"));

    for _ in 0..2 {
        let text = gateway
            .diagnose_plant(&leaf())
            .await
            .expect("credentials are present");
        assert_eq!(text, DIAGNOSIS_EMPTY_FALLBACK);
    }
}

#[tokio::test]
async fn advisor_empty_response_uses_fixed_message() {
    let model = ScriptedModel::replying(vec![Ok(Some(String::new()))]);
    let gateway = gateway_with(model.clone(), StaticCredentials::new("key-1"));

    let text = gateway
        .ask_advisor("Best fertilizer for rice?", "en")
        .await
        .expect("credentials are present");

    assert_eq!(text, "I couldn't generate an answer.");
    assert_eq!(text, ADVISORY_EMPTY_FALLBACK);

    let calls = model.calls();
    let (_, request) = &calls[0];
    assert_eq!(request.model, "text-model");
    assert_eq!(
        request.prompt_text(),
        "You are an expert agricultural advisor. The user asks: \"Best fertilizer for rice?\". Answer in en language concisely and helpfully."
    );
}

#[tokio::test]
async fn advisor_failure_degrades_to_service_unavailable() {
    let model = ScriptedModel::replying(vec![Err(GenerationError::Timeout)]);
    let gateway = gateway_with(model, StaticCredentials::new("key-1"));

    let text = gateway
        .ask_advisor("When to sow wheat?", "Punjabi")
        .await
        .expect("failures never surface as errors");

    assert_eq!(text, ADVISORY_FAILURE_FALLBACK);
}

#[tokio::test]
async fn missing_credentials_fail_before_any_model_call() {
    let model = ScriptedModel::replying(vec![Ok(Some("unused".to_string()))]);
    let gateway = gateway_with(model.clone(), StaticCredentials::missing());

    let diagnosis = gateway.diagnose_plant(&leaf()).await;
    let answer = gateway.ask_advisor("Best fertilizer for rice?", "en").await;

    assert!(matches!(
        diagnosis,
        Err(ConfigurationError::MissingCredential(_))
    ));
    assert!(matches!(answer, Err(ConfigurationError::MissingCredential(_))));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn each_call_issues_exactly_one_request() {
    let model = ScriptedModel::replying(vec![
        Err(GenerationError::ProviderFailure("status=500 code=INTERNAL".to_string())),
        Ok(Some("second".to_string())),
    ]);
    let gateway = gateway_with(model.clone(), StaticCredentials::new("key-1"));

    let first = gateway
        .ask_advisor("q1", "en")
        .await
        .expect("credentials are present");
    assert_eq!(first, ADVISORY_FAILURE_FALLBACK);
    assert_eq!(model.calls().len(), 1);

    let second = gateway
        .ask_advisor("q2", "en")
        .await
        .expect("credentials are present");
    assert_eq!(second, "second");
    assert_eq!(model.calls().len(), 2);
}
