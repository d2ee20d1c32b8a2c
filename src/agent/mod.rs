use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::error::EmptyQuery;
use crate::instrumentation::{Outcome, RequestLog};
use crate::llm::{AnswerModel, Attribution, GroundingAttribution, ModelResponse};

/// What the presentation layer shows for the last submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderResult {
    Warning { message: String },
    Error { message: String },
    Success { answer: String, sources: Vec<Attribution> },
}

impl RenderResult {
    pub fn outcome(&self) -> Outcome {
        match self {
            RenderResult::Warning { .. } => Outcome::Warning,
            RenderResult::Error { .. } => Outcome::Error,
            RenderResult::Success { .. } => Outcome::Success,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub result: RenderResult,
    pub log: RequestLog,
}

/// Handles form submissions against a configured model. Holds no state
/// between submissions.
#[derive(Clone)]
pub struct SearchAgent {
    model: Arc<dyn AnswerModel>,
}

impl SearchAgent {
    pub fn new(model: Arc<dyn AnswerModel>) -> Self {
        Self { model }
    }

    pub async fn handle_submit(&self, query: &str) -> RenderResult {
        self.submit(query).await.result
    }

    pub async fn submit(&self, query: &str) -> Submission {
        let start = Instant::now();

        let (result, usage) = match validate_query(query) {
            Err(empty) => (
                RenderResult::Warning {
                    message: empty.to_string(),
                },
                None,
            ),
            Ok(query) => match self.model.generate(query).await {
                Ok(response) => {
                    let usage = response.usage;
                    (success(response), usage)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "generate failed");
                    (
                        RenderResult::Error {
                            message: format!("An error occurred: {}", err),
                        },
                        None,
                    )
                }
            },
        };

        let num_sources = match &result {
            RenderResult::Success { sources, .. } => sources.len(),
            _ => 0,
        };
        let log = RequestLog::new(query, result.outcome(), num_sources, start.elapsed(), usage);
        log.emit();

        Submission { result, log }
    }
}

fn validate_query(query: &str) -> Result<&str, EmptyQuery> {
    if query.trim().is_empty() {
        Err(EmptyQuery)
    } else {
        Ok(query)
    }
}

fn success(response: ModelResponse) -> RenderResult {
    RenderResult::Success {
        answer: response.answer_text,
        sources: extract_sources(response.grounding),
    }
}

/// Keeps web-backed entries only, in response order.
fn extract_sources(grounding: Vec<GroundingAttribution>) -> Vec<Attribution> {
    grounding.into_iter().filter_map(|g| g.web).collect()
}
