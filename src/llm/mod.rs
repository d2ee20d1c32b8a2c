pub mod gemini;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::RemoteServiceError;

pub use gemini::GeminiClient;

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful and concise search-powered assistant. \
Answer the user's query based *only* on the provided search results. \
Cite your sources.";

/// One cited web source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribution {
    pub uri: String,
    pub title: String,
}

/// A grounding entry as the service returned it. Only entries backed by a
/// web page carry `web`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingAttribution {
    pub web: Option<Attribution>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub answer_text: String,
    pub grounding: Vec<GroundingAttribution>,
    pub usage: Option<Usage>,
}

/// A search-grounded model that answers one question per call.
#[async_trait]
pub trait AnswerModel: Send + Sync {
    async fn generate(&self, query: &str) -> Result<ModelResponse, RemoteServiceError>;
}
