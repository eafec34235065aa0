pub mod advisory;
pub mod canned;
pub mod credentials;
pub mod gateway;
pub mod gemini;
pub mod prompts;

pub use advisory::{AdvisoryGateway, AdvisoryModels};
pub use canned::CannedModel;
pub use credentials::{
    API_KEY_ENV_VARS, ConfigurationError, CredentialSource, EnvCredentials, StaticCredentials,
};
pub use gateway::{
    ContentPart, GenerationError, GenerationFuture, GenerationRequest, GenerationResponse,
    GenerativeModel, TokenUsage,
};
pub use gemini::{GeminiClient, GeminiClientConfig, GeminiClientError};
pub use prompts::{
    ADVISORY_EMPTY_FALLBACK, ADVISORY_FAILURE_FALLBACK, DIAGNOSIS_EMPTY_FALLBACK,
    DIAGNOSIS_FAILURE_FALLBACK, DIAGNOSIS_INSTRUCTION, advisory_prompt,
};
