use serde::Serialize;
use std::time::Duration;

use crate::llm::Usage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Warning,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Warning => "warning",
            Outcome::Error => "error",
        }
    }
}

/// One record per form submission.
#[derive(Debug, Clone, Serialize)]
pub struct RequestLog {
    pub id: String,
    pub timestamp: String,
    pub query: String,
    pub outcome: Outcome,
    pub num_sources: usize,
    pub latency_ms: u64,
    pub llm_input_tokens: u32,
    pub llm_output_tokens: u32,
}

impl RequestLog {
    pub fn new(
        query: &str,
        outcome: Outcome,
        num_sources: usize,
        latency: Duration,
        usage: Option<Usage>,
    ) -> Self {
        let usage = usage.unwrap_or_default();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            query: query.to_string(),
            outcome,
            num_sources,
            latency_ms: latency.as_millis() as u64,
            llm_input_tokens: usage.input_tokens,
            llm_output_tokens: usage.output_tokens,
        }
    }

    pub fn total_tokens(&self) -> u32 {
        self.llm_input_tokens + self.llm_output_tokens
    }

    pub fn summary(&self) -> String {
        format!(
            "Outcome: {} | Sources: {} | Latency: {:.1}s | Tokens used by LLM: {}",
            self.outcome.as_str(),
            self.num_sources,
            self.latency_ms as f64 / 1000.0,
            self.total_tokens(),
        )
    }

    pub fn emit(&self) {
        tracing::info!(
            request_id = %self.id,
            outcome = self.outcome.as_str(),
            sources = self.num_sources,
            latency_ms = self.latency_ms,
            input_tokens = self.llm_input_tokens,
            output_tokens = self.llm_output_tokens,
            "request handled"
        );
    }
}
