pub mod markdown;
pub mod page;

pub use page::Page;

use crate::agent::RenderResult;

pub const PAGE_TITLE: &str = "AI Search Agent";
pub const PAGE_ICON: &str = "🤖";
pub const DESCRIPTION: &str = "Ask a question, and the agent will use Google Search to find the \
most up-to-date information and provide a synthesized answer.";
pub const INPUT_LABEL: &str = "What would you like to know?";
pub const INPUT_PLACEHOLDER: &str = "e.g., What's the weather in London?";
pub const SUBMIT_LABEL: &str = "Ask Agent";
pub const BUSY_TEXT: &str = "Searching and thinking...";

/// Page state between two renders.
///
/// `Idle` is the initial state and shows the form only. A submission moves
/// the page to `Completed` carrying the single result to display; the form
/// stays live, so the next submission starts from there. The in-flight
/// (submitted) state lives in the browser as the busy indicator. `Halted`
/// means startup failed: no form is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    Idle,
    Completed { query: String, result: RenderResult },
    Halted { message: String },
}
