use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::{AnswerModel, Attribution, GroundingAttribution, ModelResponse, Usage, SYSTEM_INSTRUCTION};
use crate::config::Credential;
use crate::error::{RemoteServiceError, StartupError};

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: HeaderValue,
    model: String,
    endpoint: Url,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    tools: Vec<Tool>,
}

#[derive(Debug, Clone, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Clone, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Clone, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Clone, Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GeminiClient {
    pub fn new(credential: &Credential, model: &str, base_url: &str) -> Result<Self, StartupError> {
        let mut api_key = HeaderValue::from_str(credential.expose()).map_err(|_| {
            StartupError::ClientConfiguration(
                "API key contains characters that are not allowed in a request header".into(),
            )
        })?;
        api_key.set_sensitive(true);

        let model = model.trim();
        if model.is_empty() {
            return Err(StartupError::ClientConfiguration(
                "model name must not be empty".into(),
            ));
        }

        let endpoint = Url::parse(&format!(
            "{}/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model
        ))
        .map_err(|e| StartupError::ClientConfiguration(format!("invalid API base URL: {}", e)))?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| StartupError::ClientConfiguration(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model: model.to_string(),
            endpoint,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AnswerModel for GeminiClient {
    async fn generate(&self, query: &str) -> Result<ModelResponse, RemoteServiceError> {
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: query }],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };

        tracing::debug!(model = %self.model, "sending generateContent request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", self.api_key.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body));
        }

        let body = response.text().await?;
        let api_response: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| RemoteServiceError::MalformedResponse(e.to_string()))?;

        into_model_response(api_response)
    }
}

fn map_http_error(status: StatusCode, body: &str) -> RemoteServiceError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        RemoteServiceError::QuotaExceeded(message)
    } else {
        RemoteServiceError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

fn into_model_response(
    api_response: GenerateContentResponse,
) -> Result<ModelResponse, RemoteServiceError> {
    if let Some(reason) = api_response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(RemoteServiceError::Blocked(reason));
    }

    let usage = api_response.usage_metadata.map(|u| Usage {
        input_tokens: u.prompt_token_count,
        output_tokens: u.candidates_token_count,
    });

    let candidate = api_response.candidates.into_iter().next().ok_or_else(|| {
        RemoteServiceError::MalformedResponse("response contained no candidates".into())
    })?;

    let texts: Vec<String> = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if texts.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
        return Err(RemoteServiceError::MalformedResponse(format!(
            "response contained no answer text (finish reason: {})",
            reason
        )));
    }

    let grounding = candidate
        .grounding_metadata
        .map(|metadata| metadata.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .map(|chunk| GroundingAttribution {
            web: chunk.web.map(|web| Attribution {
                uri: web.uri,
                title: web.title,
            }),
        })
        .collect();

    Ok(ModelResponse {
        answer_text: texts.join(""),
        grounding,
        usage,
    })
}
