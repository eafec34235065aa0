pub mod gemini_mock;

use std::sync::Arc;

use agri_core::llm::{
    AdvisoryGateway, AdvisoryModels, GeminiClient, GeminiClientConfig, StaticCredentials,
};
use agri_core::models::{Language, Theme, UserProfile};
use agri_core::navigation::Navigator;

pub const TEST_API_KEY: &str = "integration-test-key";

pub fn live_gateway(base_url: &str, credentials: StaticCredentials) -> AdvisoryGateway {
    let client = GeminiClient::new(GeminiClientConfig {
        api_base_url: base_url.to_string(),
        timeout_ms: 5_000,
    })
    .expect("gemini client should build");

    AdvisoryGateway::new(
        Arc::new(client),
        Arc::new(credentials),
        AdvisoryModels {
            vision: "vision-model".to_string(),
            text: "text-model".to_string(),
        },
    )
}

pub fn signed_in_navigator(language: Language) -> Navigator {
    let mut navigator = Navigator::new(Theme::Light);
    navigator.login(UserProfile {
        name: "Gurpreet".to_string(),
        language,
        location: "Amritsar, Punjab".to_string(),
    });
    navigator
}
