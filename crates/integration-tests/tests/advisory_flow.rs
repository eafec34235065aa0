mod support;

use agri_core::image::ImagePayload;
use agri_core::llm::{ADVISORY_FAILURE_FALLBACK, ConfigurationError, StaticCredentials};
use agri_core::models::Language;
use agri_core::navigation::{AppEvent, TransitionError, View};
use agri_core::screen::Screen;
use axum::http::StatusCode;
use serde_json::json;

use support::gemini_mock::{MockGeminiServer, error_reply, text_reply};
use support::{TEST_API_KEY, live_gateway, signed_in_navigator};

#[tokio::test]
async fn diagnosis_round_trip_updates_disease_screen() {
    let server = MockGeminiServer::start(vec![text_reply(
        "## Disease\nLeaf rust\n## Treatment\nPropiconazole spray",
    )])
    .await;
    let gateway = live_gateway(&server.base_url, StaticCredentials::new(TEST_API_KEY));
    let mut navigator = signed_in_navigator(Language::En);

    navigator
        .navigate(Screen::DiseaseDetection)
        .expect("disease screen should be reachable");
    navigator
        .select_image(
            ImagePayload::from_data_uri("data:image/png;base64,AQIDBA==")
                .expect("data uri should decode"),
        )
        .expect("image should be accepted");
    let (ticket, image) = navigator
        .request_diagnosis()
        .expect("diagnosis should start");

    let text = gateway
        .diagnose_plant(&image)
        .await
        .expect("credentials are present");
    navigator
        .dispatch(AppEvent::DiagnosisCompleted { ticket, text })
        .expect("result should apply to the live view");

    match &navigator.state().view {
        View::DiseaseDetection(view) => {
            assert!(!view.analyzing);
            assert_eq!(
                view.result.as_deref(),
                Some("## Disease\nLeaf rust\n## Treatment\nPropiconazole spray")
            );
        }
        other => panic!("unexpected view: {other:?}"),
    }

    let calls = server.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model_call, "vision-model:generateContent");
    assert_eq!(calls[0].api_key.as_deref(), Some(TEST_API_KEY));
    assert_eq!(
        calls[0].body["contents"][0]["parts"][0],
        json!({ "inlineData": { "mimeType": "image/png", "data": "AQIDBA==" } })
    );
}

#[tokio::test]
async fn advisory_prompt_uses_session_language() {
    let server = MockGeminiServer::start(vec![text_reply("Use 120 kg urea per hectare.")]).await;
    let gateway = live_gateway(&server.base_url, StaticCredentials::new(TEST_API_KEY));
    let mut navigator = signed_in_navigator(Language::Pa);

    navigator
        .navigate(Screen::CropAdvisory)
        .expect("advisory screen should be reachable");
    let (ticket, question, language) = navigator
        .request_advice("  Best fertilizer for rice?  ")
        .expect("question should be accepted");
    let text = gateway
        .ask_advisor(&question, language.prompt_name())
        .await
        .expect("credentials are present");
    navigator
        .dispatch(AppEvent::AdvisoryCompleted { ticket, text })
        .expect("answer should apply");

    let calls = server.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model_call, "text-model:generateContent");
    assert_eq!(
        calls[0].body["contents"][0]["parts"][0]["text"],
        json!(
            "You are an expert agricultural advisor. The user asks: \"Best fertilizer for rice?\". Answer in Punjabi language concisely and helpfully."
        )
    );

    match &navigator.state().view {
        View::CropAdvisory(view) => {
            assert_eq!(view.answer.as_deref(), Some("Use 120 kg urea per hectare."));
        }
        other => panic!("unexpected view: {other:?}"),
    }
}

#[tokio::test]
async fn service_failure_shows_fallback_answer() {
    let server = MockGeminiServer::start(vec![error_reply(
        StatusCode::TOO_MANY_REQUESTS,
        "RESOURCE_EXHAUSTED",
    )])
    .await;
    let gateway = live_gateway(&server.base_url, StaticCredentials::new(TEST_API_KEY));
    let mut navigator = signed_in_navigator(Language::En);

    navigator
        .navigate(Screen::CropAdvisory)
        .expect("advisory screen should be reachable");
    let (ticket, question, language) = navigator
        .request_advice("When should I irrigate wheat?")
        .expect("question should be accepted");
    let text = gateway
        .ask_advisor(&question, language.prompt_name())
        .await
        .expect("failures are recovered inside the gateway");
    navigator
        .dispatch(AppEvent::AdvisoryCompleted { ticket, text })
        .expect("fallback should apply");

    match &navigator.state().view {
        View::CropAdvisory(view) => {
            assert_eq!(view.answer.as_deref(), Some(ADVISORY_FAILURE_FALLBACK));
        }
        other => panic!("unexpected view: {other:?}"),
    }
    assert_eq!(server.calls().await.len(), 1);
}

#[tokio::test]
async fn answer_arriving_after_leaving_the_screen_is_discarded() {
    let server = MockGeminiServer::start(vec![text_reply("Sow in early November.")]).await;
    let gateway = live_gateway(&server.base_url, StaticCredentials::new(TEST_API_KEY));
    let mut navigator = signed_in_navigator(Language::En);

    navigator
        .navigate(Screen::CropAdvisory)
        .expect("advisory screen should be reachable");
    let (ticket, question, language) = navigator
        .request_advice("When to sow wheat?")
        .expect("question should be accepted");

    navigator
        .navigate(Screen::MarketPrices)
        .expect("market screen should be reachable");
    navigator
        .navigate(Screen::CropAdvisory)
        .expect("advisory screen should be reachable again");

    let text = gateway
        .ask_advisor(&question, language.prompt_name())
        .await
        .expect("credentials are present");
    let err = navigator
        .dispatch(AppEvent::AdvisoryCompleted { ticket, text })
        .expect_err("answer belongs to a previous view instance");

    assert_eq!(err, TransitionError::StaleResult(ticket));
    match &navigator.state().view {
        View::CropAdvisory(view) => {
            assert!(view.answer.is_none());
            assert!(!view.loading);
        }
        other => panic!("unexpected view: {other:?}"),
    }
}

#[tokio::test]
async fn missing_credentials_never_reach_the_service() {
    let server = MockGeminiServer::start(vec![text_reply("unused")]).await;
    let gateway = live_gateway(&server.base_url, StaticCredentials::missing());

    let image =
        ImagePayload::new("image/jpeg", vec![0xff, 0xd8, 0xff]).expect("payload should build");
    let diagnosis = gateway.diagnose_plant(&image).await;
    let answer = gateway.ask_advisor("Best fertilizer for rice?", "en").await;

    assert!(matches!(
        diagnosis,
        Err(ConfigurationError::MissingCredential(_))
    ));
    assert!(matches!(answer, Err(ConfigurationError::MissingCredential(_))));
    assert!(server.calls().await.is_empty());
}
